//! Test doubles for the engine's collaborator traits, with counters for the
//! interactions the scenarios assert on.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keyscout_common::config::Credential;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::license::{HostInfo, LicensingProduct, ServiceState};
use keyscout_core::aggregator::Collaborators;
use keyscout_core::ports::{HostResolver, LicensingQuery, ManagementClient, ToolInvoker};

pub fn workstation_info() -> HostInfo {
    HostInfo {
        computer_name: "WORKSTATION01".into(),
        os_caption: "Microsoft Windows 10 Pro".into(),
        os_version: "10.0.19045".into(),
        manufacturer: "Dell Inc.".into(),
        model: "OptiPlex 7080".into(),
        serial_number: "ABC1234".into(),
    }
}

pub fn licensed_product(partial: &str) -> LicensingProduct {
    LicensingProduct {
        name: "Windows(R), Professional edition".into(),
        product_id: "00330-80000-00000-AA219".into(),
        partial_key: Some(partial.to_string()),
        license_status: Some(1),
    }
}

pub struct MockResolver {
    pub hostname: String,
    pub is_local: bool,
    pub reachable: bool,
}

impl MockResolver {
    pub fn local(hostname: &str) -> Self {
        Self {
            hostname: hostname.into(),
            is_local: true,
            reachable: true,
        }
    }

    pub fn remote(hostname: &str, reachable: bool) -> Self {
        Self {
            hostname: hostname.into(),
            is_local: false,
            reachable,
        }
    }
}

#[async_trait]
impl HostResolver for MockResolver {
    async fn resolve(&self, requested: &str) -> Result<Host, SourceError> {
        if self.is_local {
            Ok(Host::local(self.hostname.clone()))
        } else {
            Ok(Host::remote(
                requested,
                self.hostname.clone(),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)),
            ))
        }
    }

    async fn is_reachable(&self, _host: &Host) -> bool {
        self.reachable
    }
}

#[derive(Default)]
pub struct MockManagement {
    pub host_info: Option<HostInfo>,
    pub products: Vec<LicensingProduct>,
    pub legacy_products: Vec<LicensingProduct>,
    pub original_key: Option<String>,
    /// DigitalProductId blobs by registry path.
    pub binary_values: HashMap<String, Vec<u8>>,
    pub string_values: HashMap<(String, String), String>,
    /// Paths whose reads raise instead of returning absent.
    pub failing_paths: HashSet<String>,
    pub service_state: Mutex<Option<ServiceState>>,
    pub service_queries: AtomicUsize,
    pub service_starts: AtomicUsize,
    pub service_stops: AtomicUsize,
}

impl MockManagement {
    pub fn available() -> Self {
        Self {
            host_info: Some(workstation_info()),
            service_state: Mutex::new(Some(ServiceState::Running)),
            ..Self::default()
        }
    }

    pub fn with_service_state(mut self, state: ServiceState) -> Self {
        self.service_state = Mutex::new(Some(state));
        self
    }
}

#[async_trait]
impl ManagementClient for MockManagement {
    async fn query_host_info(&self, host: &Host) -> Result<HostInfo, SourceError> {
        self.host_info
            .clone()
            .ok_or_else(|| SourceError::ManagementUnavailable {
                host: host.hostname.clone(),
                reason: "interface not responding".into(),
            })
    }

    async fn query_licensing_products(
        &self,
        _host: &Host,
        query: LicensingQuery,
    ) -> Result<Vec<LicensingProduct>, SourceError> {
        match query {
            LicensingQuery::SoftwareLicensingProduct => Ok(self.products.clone()),
            LicensingQuery::OfficeSoftwareProtection => Ok(self.legacy_products.clone()),
        }
    }

    async fn query_original_product_key(
        &self,
        _host: &Host,
    ) -> Result<Option<String>, SourceError> {
        Ok(self.original_key.clone())
    }

    async fn read_binary_value(
        &self,
        host: &Host,
        path: &str,
        _name: &str,
    ) -> Result<Option<Vec<u8>>, SourceError> {
        if self.failing_paths.contains(path) {
            return Err(SourceError::NoRegistryAccess(host.hostname.clone()));
        }
        Ok(self.binary_values.get(path).cloned())
    }

    async fn read_string_value(
        &self,
        _host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, SourceError> {
        Ok(self
            .string_values
            .get(&(path.to_string(), name.to_string()))
            .cloned())
    }

    async fn query_service_state(
        &self,
        host: &Host,
        _service: &str,
    ) -> Result<ServiceState, SourceError> {
        self.service_queries.fetch_add(1, Ordering::SeqCst);
        self.service_state
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::SourceUnavailable {
                label: "service control".into(),
                reason: format!("cannot query services on {}", host.hostname),
            })
    }

    async fn set_service_state(
        &self,
        _host: &Host,
        _service: &str,
        state: ServiceState,
    ) -> Result<(), SourceError> {
        match state {
            ServiceState::Running => self.service_starts.fetch_add(1, Ordering::SeqCst),
            _ => self.service_stops.fetch_add(1, Ordering::SeqCst),
        };
        *self.service_state.lock().unwrap() = Some(state);
        Ok(())
    }
}

pub struct MockInvoker {
    pub output: Option<String>,
}

#[async_trait]
impl ToolInvoker for MockInvoker {
    async fn invoke(
        &self,
        _host: &Host,
        _credential: Option<&Credential>,
    ) -> Result<String, SourceError> {
        self.output
            .clone()
            .ok_or_else(|| SourceError::SourceUnavailable {
                label: "ExternalTool".into(),
                reason: "no output configured".into(),
            })
    }
}

pub fn collaborators(
    resolver: MockResolver,
    client: Arc<MockManagement>,
    tool: MockInvoker,
) -> Collaborators {
    Collaborators {
        resolver: Arc::new(resolver),
        client,
        tool: Arc::new(tool),
    }
}
