//! # External Tool Adapter
//!
//! One-shot invocation of an external decoding utility (ProduKey-style)
//! against a host, followed by parsing of its tab-separated output. Every
//! failure mode is per-source: a missing binary, a hung or failed run, or
//! unparsable output contributes zero records and touches nothing else.

use keyscout_common::config::Config;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::record::{KeySource, RawKey};
use tracing::warn;

use crate::ports::ToolInvoker;

/// Expected columns: product name, product id, product key, install folder,
/// service pack, build number, host name, modified time.
const TOOL_COLUMNS: usize = 8;
const HOST_NAME_COLUMN: usize = 6;

/// Runs the external tool for `host` and parses its output.
pub async fn fetch_tool_keys(
    invoker: &dyn ToolInvoker,
    host: &Host,
    cfg: &Config,
) -> Result<Vec<RawKey>, SourceError> {
    let Some(path) = cfg.produkey_path.as_deref() else {
        return Err(SourceError::SourceUnavailable {
            label: KeySource::ExternalTool.to_string(),
            reason: "no tool path configured".into(),
        });
    };
    if !path.exists() {
        return Err(SourceError::ExternalToolMissing(path.to_path_buf()));
    }

    // A hung invocation must not stall the host forever.
    let output = tokio::time::timeout(cfg.tool_timeout, invoker.invoke(host, cfg.credential.as_ref()))
        .await
        .map_err(|_| SourceError::SourceUnavailable {
            label: KeySource::ExternalTool.to_string(),
            reason: format!("timed out after {:?}", cfg.tool_timeout),
        })??;

    parse_tool_output(&output, host)
}

/// Parses the tool's tab-separated table into raw keys.
///
/// A host name mismatch inside the output is warned about once per host but
/// the rows are still included.
pub fn parse_tool_output(output: &str, host: &Host) -> Result<Vec<RawKey>, SourceError> {
    let mut keys = Vec::new();
    let mut warned_mismatch = false;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < TOOL_COLUMNS {
            return Err(SourceError::ExternalToolParseError(format!(
                "expected {TOOL_COLUMNS} columns, got {} in {line:?}",
                columns.len()
            )));
        }

        let reported_host = columns[HOST_NAME_COLUMN].trim();
        if !warned_mismatch
            && !reported_host.is_empty()
            && !reported_host.eq_ignore_ascii_case(&host.hostname)
        {
            warn!(
                host = %host.hostname,
                reported = reported_host,
                "external tool reports a different host name"
            );
            warned_mismatch = true;
        }

        keys.push(RawKey {
            product_name: columns[0].trim().to_string(),
            product_id: columns[1].trim().to_string(),
            product_key: columns[2].trim().to_string(),
            license_status: None,
            source: KeySource::ExternalTool,
            sentinel: false,
        });
    }

    Ok(keys)
}
