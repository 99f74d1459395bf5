use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the recovery pipeline.
///
/// None of these abort processing of other sources or other hosts: each is
/// caught at the boundary of the component that produced it and turned into
/// either a sentinel record or a log line.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("host {0} is unreachable")]
    HostUnreachable(String),

    #[error("management interface unavailable on {host}: {reason}")]
    ManagementUnavailable { host: String, reason: String },

    // The field is `label`, not `source`: thiserror reserves `source` for an
    // underlying error cause, and these carry a plain name.
    #[error("source {label} unavailable: {reason}")]
    SourceUnavailable { label: String, reason: String },

    #[error("digital product id blob is {0} bytes, need at least 67")]
    MalformedBlob(usize),

    #[error("no registry access on {0}")]
    NoRegistryAccess(String),

    #[error("external tool not found at {}", .0.display())]
    ExternalToolMissing(PathBuf),

    #[error("external tool produced no output at {}", .0.display())]
    ExternalToolOutputMissing(PathBuf),

    #[error("could not parse external tool output: {0}")]
    ExternalToolParseError(String),

    #[error("failed to restore service state on {host}: {reason}")]
    ServiceStateRestoreFailed { host: String, reason: String },
}
