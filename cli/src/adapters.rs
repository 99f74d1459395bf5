//! Production collaborators wired into the engine's trait seams.

pub mod produkey;
pub mod resolver;
pub mod wmi;

use std::sync::Arc;

use keyscout_common::config::Config;
use keyscout_core::aggregator::Collaborators;

pub fn collaborators(cfg: &Config) -> Collaborators {
    Collaborators {
        resolver: Arc::new(resolver::SystemResolver),
        client: Arc::new(wmi::CimClient::new(cfg.credential.clone())),
        tool: Arc::new(produkey::ProduKeyInvoker::new(cfg.produkey_path.clone())),
    }
}
