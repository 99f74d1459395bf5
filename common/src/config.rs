use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration, read-only after startup.
///
/// Every flag maps to one command line switch. Hosts are not part of the
/// config; they travel separately so that per-host work stays independent.
#[derive(Debug, Clone)]
pub struct Config {
    /// Suppresses unreachable/error/"not found" sentinel records.
    pub show_only_valid: bool,
    /// Never force-start the remote registry access service.
    pub dont_enable_remote_registry: bool,
    /// Omit the registry DigitalProductId sources entirely.
    pub skip_reg_product_key: bool,
    /// Omit the two DefaultProductKey registry paths.
    pub skip_default_product_keys: bool,
    /// Omit OEM manufacturer/model fields from emitted records.
    pub skip_oem_info: bool,
    /// Omit the external decoding tool source.
    pub skip_produkey: bool,
    /// Filesystem location of the external decoding tool.
    pub produkey_path: Option<PathBuf>,
    /// Identity used for remote access.
    pub credential: Option<Credential>,
    /// Upper bound on one external tool invocation.
    pub tool_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_only_valid: false,
            dont_enable_remote_registry: false,
            skip_reg_product_key: false,
            skip_default_product_keys: false,
            skip_oem_info: false,
            skip_produkey: false,
            produkey_path: None,
            credential: None,
            tool_timeout: Duration::from_secs(30),
        }
    }
}

/// Remote access identity. The secret is held in memory only and is never
/// rendered by `Debug` or `Display`.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
