//! # Multi-Source Aggregation Engine
//!
//! Drives every source for one host, tolerating partial failure of each
//! independently, and merges the raw results into one normalized record
//! stream. Hosts are fully independent and run in parallel; within a host
//! sources run sequentially because later steps depend on earlier ones
//! (management reachability, the service lease).

use std::sync::Arc;

use keyscout_common::config::Config;
use keyscout_common::model::host::Host;
use keyscout_common::model::record::{KeyRecord, RawKey};
use tracing::{debug, info, warn};

use crate::lease::ServiceLease;
use crate::ports::{HostResolver, ManagementClient, ToolInvoker};
use crate::sources::{licensing, produkey, registry};

const UNREACHABLE: &str = "Unreachable";
const MANAGEMENT_UNAVAILABLE: &str = "ManagementUnavailable";

/// The injected collaborators every host query runs against.
pub struct Collaborators {
    pub resolver: Arc<dyn HostResolver>,
    pub client: Arc<dyn ManagementClient>,
    pub tool: Arc<dyn ToolInvoker>,
}

/// Recovers key records for every requested host, one task per host.
///
/// No state is shared across hosts beyond the read-only config and the
/// collaborators, so a failing host never affects another.
pub async fn recover_keys(
    targets: Vec<String>,
    cfg: Arc<Config>,
    deps: Arc<Collaborators>,
) -> Vec<KeyRecord> {
    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let cfg = Arc::clone(&cfg);
        let deps = Arc::clone(&deps);
        handles.push(tokio::spawn(async move {
            recover_host(&target, &cfg, &deps).await
        }));
    }

    let mut records = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(host_records) => records.extend(host_records),
            Err(err) => warn!("host task panicked: {err}"),
        }
    }
    records
}

/// Runs the full per-host pipeline: resolve, reachability, management
/// interface, licensing sources, registry sources under a service lease,
/// external tool, then merge/filter/projection.
pub async fn recover_host(target: &str, cfg: &Config, deps: &Collaborators) -> Vec<KeyRecord> {
    let host = match deps.resolver.resolve(target).await {
        Ok(host) => host,
        Err(err) => {
            warn!(host = target, "resolution failed: {err}");
            return unreachable_records(target, cfg);
        }
    };

    if !host.is_local && !deps.resolver.is_reachable(&host).await {
        warn!(host = target, "host did not respond");
        return unreachable_records(&host.requested, cfg);
    }

    let info = match deps.client.query_host_info(&host).await {
        Ok(info) => info,
        Err(err) => {
            warn!(host = %host.hostname, "management interface unavailable: {err}");
            if cfg.show_only_valid {
                return Vec::new();
            }
            return vec![KeyRecord::sentinel(
                host.hostname.clone(),
                MANAGEMENT_UNAVAILABLE,
                MANAGEMENT_UNAVAILABLE,
            )];
        }
    };
    info!(host = %host.hostname, os = %info.os_caption, "querying key sources");

    let mut raw: Vec<RawKey> = Vec::new();

    match licensing::software_licensing_products(deps.client.as_ref(), &host).await {
        Ok(keys) => raw.extend(keys),
        Err(err) => debug!(host = %host.hostname, "licensing product source: {err}"),
    }
    match licensing::original_product_key(deps.client.as_ref(), &host).await {
        Ok(keys) => raw.extend(keys),
        Err(err) => debug!(host = %host.hostname, "licensing service source: {err}"),
    }
    match licensing::legacy_licensing_products(deps.client.as_ref(), &host).await {
        Ok(keys) => raw.extend(keys),
        Err(err) => debug!(host = %host.hostname, "legacy licensing source: {err}"),
    }

    if !cfg.skip_reg_product_key {
        raw.extend(registry_sources_under_lease(&host, cfg, deps).await);
    }

    if !cfg.skip_produkey {
        match produkey::fetch_tool_keys(deps.tool.as_ref(), &host, cfg).await {
            Ok(keys) => raw.extend(keys),
            Err(err) => warn!(host = %host.hostname, "external tool source: {err}"),
        }
    }

    raw.into_iter()
        .map(|key| KeyRecord::from_raw(&host, &info, key))
        .filter(|record| !cfg.show_only_valid || record.is_valid())
        .map(|record| record.projected(cfg.skip_oem_info))
        .collect()
}

/// Scopes the registry walk inside a service lease on remote hosts.
///
/// The walk itself is infallible (per-path failures become log lines or
/// sentinels), so the release below runs on every path through this block.
async fn registry_sources_under_lease(
    host: &Host,
    cfg: &Config,
    deps: &Collaborators,
) -> Vec<RawKey> {
    let lease = if host.is_local {
        None
    } else {
        Some(
            ServiceLease::acquire(
                Arc::clone(&deps.client),
                host,
                !cfg.dont_enable_remote_registry,
            )
            .await,
        )
    };

    let keys = registry::read_digital_product_ids(deps.client.as_ref(), host, cfg).await;

    if let Some(lease) = lease {
        lease.release().await;
    }
    keys
}

fn unreachable_records(target: &str, cfg: &Config) -> Vec<KeyRecord> {
    if cfg.show_only_valid {
        return Vec::new();
    }
    vec![KeyRecord::sentinel(target, UNREACHABLE, UNREACHABLE)]
}
