//! # Host Identity Model
//!
//! A [`Host`] captures everything the pipeline knows about one queried
//! machine. It is resolved once per query attempt and immutable afterwards,
//! so every source sees the same identity.

use std::net::IpAddr;

/// Identity of one machine under query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// The name or address exactly as the caller requested it.
    pub requested: String,
    /// Hostname after resolution.
    pub hostname: String,
    /// Resolved address, if resolution produced one.
    pub ip: Option<IpAddr>,
    /// Whether this is the machine running the tool.
    pub is_local: bool,
}

impl Host {
    pub fn local(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            requested: hostname.clone(),
            hostname,
            ip: None,
            is_local: true,
        }
    }

    pub fn remote(requested: impl Into<String>, hostname: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            requested: requested.into(),
            hostname: hostname.into(),
            ip: Some(ip),
            is_local: false,
        }
    }
}
