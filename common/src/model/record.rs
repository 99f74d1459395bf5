//! # Key Record Model
//!
//! [`KeyRecord`] is the unit of output: one discovered (or attempted) product
//! key per host per source. Records are immutable once constructed and are
//! accumulated per host in discovery order.

use std::fmt;

use crate::model::host::Host;
use crate::model::license::{HostInfo, LicenseStatus};

/// Origin of a record. The `Display` label appears verbatim in output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Licensing products exposing a partial key plus activation status.
    LicensingProductA,
    /// Licensing service exposing the original (OA3x) product key.
    LicensingServiceB,
    /// Legacy licensing products (Office software protection).
    LegacyLicensingProduct,
    /// A DigitalProductId blob read from the named registry path.
    RegistryDigitalProductId(String),
    /// The external decoding utility.
    ExternalTool,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LicensingProductA => write!(f, "LicensingProductA"),
            Self::LicensingServiceB => write!(f, "LicensingServiceB"),
            Self::LegacyLicensingProduct => write!(f, "LegacyLicensingProduct"),
            Self::RegistryDigitalProductId(path) => write!(f, "{path}"),
            Self::ExternalTool => write!(f, "ExternalTool"),
        }
    }
}

/// A raw key as produced by one source, before host data is merged in.
#[derive(Debug, Clone)]
pub struct RawKey {
    pub product_name: String,
    pub product_id: String,
    pub product_key: String,
    pub license_status: Option<LicenseStatus>,
    pub source: KeySource,
    /// Marks "not found"/error placeholders that carry no real key.
    pub sentinel: bool,
}

/// The unit of output. Never mutated after construction; the OEM-less view
/// is a projection, not a structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub host: String,
    pub product_id: String,
    pub product_key: String,
    pub license_status: String,
    pub product_name: String,
    pub os_version: String,
    pub os_description: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub source: String,
    valid: bool,
}

impl KeyRecord {
    /// Merges a raw source key with the host identity and inventory data.
    pub fn from_raw(host: &Host, info: &HostInfo, raw: RawKey) -> Self {
        let product_name = if raw.product_name.is_empty() {
            info.os_caption.clone()
        } else {
            raw.product_name
        };
        Self {
            host: host.hostname.clone(),
            product_id: raw.product_id,
            product_key: raw.product_key,
            license_status: raw
                .license_status
                .map(|status| status.to_string())
                .unwrap_or_default(),
            product_name,
            os_version: info.os_version.clone(),
            os_description: info.os_caption.clone(),
            manufacturer: info.manufacturer.clone(),
            model: info.model.clone(),
            serial_number: info.serial_number.clone(),
            source: raw.source.to_string(),
            valid: !raw.sentinel,
        }
    }

    /// A placeholder record whose every data field carries `text`. Used for
    /// hosts that never reached the source-query stage.
    pub fn sentinel(host: impl Into<String>, text: &str, source: &str) -> Self {
        Self {
            host: host.into(),
            product_id: text.to_string(),
            product_key: text.to_string(),
            license_status: text.to_string(),
            product_name: text.to_string(),
            os_version: text.to_string(),
            os_description: text.to_string(),
            manufacturer: text.to_string(),
            model: text.to_string(),
            serial_number: text.to_string(),
            source: source.to_string(),
            valid: false,
        }
    }

    /// Whether this record carries a real key rather than a placeholder.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Output view. With `skip_oem` the manufacturer/model fields are blanked
    /// in the emitted copy; the underlying record keeps them.
    pub fn projected(&self, skip_oem: bool) -> Self {
        if !skip_oem {
            return self.clone();
        }
        Self {
            manufacturer: String::new(),
            model: String::new(),
            ..self.clone()
        }
    }
}
