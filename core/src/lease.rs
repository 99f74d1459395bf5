//! # Remote Registry Service Lease
//!
//! Registry reads on a remote host need the RemoteRegistry service running.
//! A [`ServiceLease`] scopes that requirement: acquire observes (and, when
//! permitted, forces) the service state, release restores it. The lease is
//! consumed by [`ServiceLease::release`], so the type system enforces the
//! exactly-once discipline.

use std::sync::Arc;

use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::license::ServiceState;
use tracing::{debug, warn};

use crate::ports::ManagementClient;

/// Service controlling remote registry access on the target host.
pub const REMOTE_REGISTRY_SERVICE: &str = "RemoteRegistry";

/// A scoped claim on the remote registry access service.
pub struct ServiceLease {
    client: Arc<dyn ManagementClient>,
    host: Host,
    prior: Option<ServiceState>,
    forced_start: bool,
}

impl ServiceLease {
    /// Observes the current service state and, when `allow_enable` is set and
    /// the service is stopped, starts it.
    ///
    /// Acquisition never fails: if the service cannot be queried or started,
    /// the lease still exists and downstream registry reads surface their own
    /// access errors.
    pub async fn acquire(
        client: Arc<dyn ManagementClient>,
        host: &Host,
        allow_enable: bool,
    ) -> Self {
        let prior = match client
            .query_service_state(host, REMOTE_REGISTRY_SERVICE)
            .await
        {
            Ok(state) => Some(state),
            Err(err) => {
                debug!(
                    host = %host.hostname,
                    "could not query {REMOTE_REGISTRY_SERVICE} state: {err}"
                );
                None
            }
        };

        let mut forced_start = false;
        if allow_enable && prior == Some(ServiceState::Stopped) {
            match client
                .set_service_state(host, REMOTE_REGISTRY_SERVICE, ServiceState::Running)
                .await
            {
                Ok(()) => {
                    debug!(host = %host.hostname, "started {REMOTE_REGISTRY_SERVICE}");
                    forced_start = true;
                }
                Err(err) => {
                    warn!(
                        host = %host.hostname,
                        "could not start {REMOTE_REGISTRY_SERVICE}: {err}"
                    );
                }
            }
        }

        Self {
            client,
            host: host.clone(),
            prior,
            forced_start,
        }
    }

    /// Whether this lease changed the service state and owes a restore.
    pub fn forced_change(&self) -> bool {
        self.forced_start
    }

    /// Restores the prior service state. Consumes the lease; restore failures
    /// are logged and never propagated, the host's other results stand.
    pub async fn release(self) {
        if !(self.forced_start && self.prior == Some(ServiceState::Stopped)) {
            return;
        }
        if let Err(err) = self
            .client
            .set_service_state(&self.host, REMOTE_REGISTRY_SERVICE, ServiceState::Stopped)
            .await
        {
            let restore_err = SourceError::ServiceStateRestoreFailed {
                host: self.host.hostname.clone(),
                reason: err.to_string(),
            };
            warn!("{restore_err}");
        }
    }
}
