//! # Licensing Interface Models
//!
//! Rows and enumerations handed over by the management interface: licensing
//! product rows, the numeric activation status mapping, host inventory data
//! and the access-service state.

use std::fmt;

/// Activation status reported by the licensing interfaces.
///
/// Total mapping over the numeric codes the interface emits; codes outside
/// the documented set fall through to [`LicenseStatus::Unknown`] and render
/// as their raw numeric value for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    Unlicensed,
    Licensed,
    OobGrace,
    OutOfToleranceGrace,
    NonGenuineGrace,
    Notification,
    ExtendedGrace,
    Unknown(u32),
}

impl From<u32> for LicenseStatus {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Unlicensed,
            1 => Self::Licensed,
            2 => Self::OobGrace,
            3 => Self::OutOfToleranceGrace,
            4 => Self::NonGenuineGrace,
            5 => Self::Notification,
            6 => Self::ExtendedGrace,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for LicenseStatus {
    // The literal strings are part of the output contract and must not drift.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlicensed => write!(f, "UNLICENSED"),
            Self::Licensed => write!(f, "Licensed"),
            Self::OobGrace => write!(f, "OOB Grace Period"),
            Self::OutOfToleranceGrace => write!(f, "Out-Of-Tolerance Grace Period"),
            Self::NonGenuineGrace => write!(f, "Non-Genuine Grace Period"),
            Self::Notification => write!(f, "NOTIFICATION"),
            Self::ExtendedGrace => write!(f, "Extended Grace"),
            Self::Unknown(code) => write!(f, "{code}"),
        }
    }
}

/// One row returned by a licensing-product query.
#[derive(Debug, Clone, Default)]
pub struct LicensingProduct {
    pub name: String,
    pub product_id: String,
    /// Truncated key fragment; rows without one carry no recoverable key.
    pub partial_key: Option<String>,
    pub license_status: Option<u32>,
}

/// Inventory data for one host, fetched once per host from the management
/// interface before any key source runs.
#[derive(Debug, Clone, Default)]
pub struct HostInfo {
    pub computer_name: String,
    pub os_caption: String,
    pub os_version: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

/// Observed state of a host service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Stopped,
    Other(String),
}
