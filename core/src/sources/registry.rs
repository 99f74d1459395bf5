//! # Registry Blob Sources
//!
//! Walks a fixed, ordered list of registry paths holding `DigitalProductId`
//! blobs. Every attempted path leaves a trace: a decoded record when the
//! blob is present and well-formed, otherwise a "not found" sentinel labeled
//! with the path. Read failures on one path never stop the walk.

use keyscout_common::config::Config;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::record::{KeySource, RawKey};
use tracing::{debug, warn};

use crate::decoder;
use crate::ports::ManagementClient;

/// Primary location of the installed product's blob.
pub const CURRENT_VERSION_PATH: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";
/// Additional default-key locations, queried unless explicitly skipped.
pub const DEFAULT_KEY_PATHS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\DefaultProductKey",
    r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\DefaultProductKey2",
];

const DIGITAL_PRODUCT_ID: &str = "DigitalProductId";
const PRODUCT_NAME: &str = "ProductName";
const PRODUCT_ID: &str = "ProductId";
const NOT_FOUND: &str = "Key not found";

/// The ordered path list for one run. The primary path always comes first.
pub fn registry_paths(cfg: &Config) -> Vec<&'static str> {
    let mut paths = vec![CURRENT_VERSION_PATH];
    if !cfg.skip_default_product_keys {
        paths.extend(DEFAULT_KEY_PATHS);
    }
    paths
}

/// Reads and decodes the blob at every configured path.
///
/// Infallible by design: per-path failures are logged or recorded as
/// sentinels so the caller's lease scope never unwinds early.
pub async fn read_digital_product_ids(
    client: &dyn ManagementClient,
    host: &Host,
    cfg: &Config,
) -> Vec<RawKey> {
    let mut keys = Vec::new();
    for path in registry_paths(cfg) {
        match read_one_path(client, host, path).await {
            Ok(key) => keys.push(key),
            Err(err) => {
                warn!(host = %host.hostname, path, "registry read failed: {err}");
                keys.push(not_found(path));
            }
        }
    }
    keys
}

async fn read_one_path(
    client: &dyn ManagementClient,
    host: &Host,
    path: &str,
) -> Result<RawKey, SourceError> {
    let Some(blob) = client
        .read_binary_value(host, path, DIGITAL_PRODUCT_ID)
        .await?
    else {
        debug!(host = %host.hostname, path, "no {DIGITAL_PRODUCT_ID} value");
        return Ok(not_found(path));
    };

    // 64-bit installs also carry a DigitalProductId4 value; its layout is
    // unconfirmed, so only the plain value name is read here.

    let product_key = match decoder::decode_digital_product_id(&blob) {
        Ok(key) => key,
        Err(SourceError::MalformedBlob(len)) => {
            // A truncated blob means no decodable key at this path, not a
            // pipeline failure.
            debug!(host = %host.hostname, path, "blob too short ({len} bytes)");
            return Ok(not_found(path));
        }
        Err(other) => return Err(other),
    };

    // Adjacent string values are best-effort; absent means empty.
    let product_name = client
        .read_string_value(host, path, PRODUCT_NAME)
        .await?
        .unwrap_or_default();
    let product_id = client
        .read_string_value(host, path, PRODUCT_ID)
        .await?
        .unwrap_or_default();

    Ok(RawKey {
        product_name,
        product_id,
        product_key,
        license_status: None,
        source: KeySource::RegistryDigitalProductId(path.to_string()),
        sentinel: false,
    })
}

fn not_found(path: &str) -> RawKey {
    RawKey {
        product_name: String::new(),
        product_id: NOT_FOUND.to_string(),
        product_key: NOT_FOUND.to_string(),
        license_status: None,
        source: KeySource::RegistryDigitalProductId(path.to_string()),
        sentinel: true,
    }
}
