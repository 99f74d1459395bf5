//! # Collaborator Interfaces
//!
//! The engine never talks to the network, the registry, or a child process
//! directly; everything arrives through these traits. Production adapters
//! live in the CLI crate, test doubles in the integration-test member.

use async_trait::async_trait;
use keyscout_common::config::Credential;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::license::{HostInfo, LicensingProduct, ServiceState};

/// Which licensing-product class a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicensingQuery {
    /// Modern products: partial key plus numeric activation status.
    SoftwareLicensingProduct,
    /// Legacy Office software protection products.
    OfficeSoftwareProtection,
}

/// Management and registry access for one host.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Inventory data; failure here means the whole management interface is
    /// unavailable for the host.
    async fn query_host_info(&self, host: &Host) -> Result<HostInfo, SourceError>;

    async fn query_licensing_products(
        &self,
        host: &Host,
        query: LicensingQuery,
    ) -> Result<Vec<LicensingProduct>, SourceError>;

    /// The OA3x original product key exposed by the licensing service, when
    /// the firmware carries one.
    async fn query_original_product_key(&self, host: &Host)
    -> Result<Option<String>, SourceError>;

    /// Reads a binary registry value. `Ok(None)` means the value is absent,
    /// which is not an error.
    async fn read_binary_value(
        &self,
        host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, SourceError>;

    /// Reads a string registry value; absent values yield `Ok(None)`.
    async fn read_string_value(
        &self,
        host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, SourceError>;

    async fn query_service_state(
        &self,
        host: &Host,
        service: &str,
    ) -> Result<ServiceState, SourceError>;

    async fn set_service_state(
        &self,
        host: &Host,
        service: &str,
        state: ServiceState,
    ) -> Result<(), SourceError>;
}

/// Name/address resolution and reachability probing.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolves a requested identifier into a [`Host`]. Resolution happens
    /// once per query attempt; the result is immutable afterwards.
    async fn resolve(&self, requested: &str) -> Result<Host, SourceError>;

    /// Whether the host answers at all. Only consulted for remote hosts.
    async fn is_reachable(&self, host: &Host) -> bool;
}

/// One-shot invocation of the external decoding utility.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Runs the tool against `host` and returns its tabular output as text.
    async fn invoke(
        &self,
        host: &Host,
        credential: Option<&Credential>,
    ) -> Result<String, SourceError>;
}
