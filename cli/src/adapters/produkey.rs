use std::path::PathBuf;

use async_trait::async_trait;
use keyscout_common::config::Credential;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_core::ports::ToolInvoker;
use tokio::process::Command;
use tracing::debug;

/// Runs the ProduKey utility in one-shot mode and hands back its
/// tab-separated output. The tool writes to a temp file (`/stab`); the file
/// is read and removed before returning.
pub struct ProduKeyInvoker {
    tool_path: Option<PathBuf>,
}

impl ProduKeyInvoker {
    pub fn new(tool_path: Option<PathBuf>) -> Self {
        Self { tool_path }
    }
}

#[async_trait]
impl ToolInvoker for ProduKeyInvoker {
    async fn invoke(
        &self,
        host: &Host,
        credential: Option<&Credential>,
    ) -> Result<String, SourceError> {
        let Some(tool) = self.tool_path.as_deref() else {
            return Err(SourceError::SourceUnavailable {
                label: "ExternalTool".into(),
                reason: "no tool path configured".into(),
            });
        };
        if credential.is_some() {
            // The tool runs under the caller's session; it has no credential
            // switch of its own.
            debug!("external tool ignores the configured credential");
        }

        let output_file = std::env::temp_dir().join(format!(
            "keyscout-{}-{}.txt",
            host.hostname,
            std::process::id()
        ));

        let mut command = Command::new(tool);
        if !host.is_local {
            command.arg("/remote").arg(&host.hostname);
        }
        command.arg("/stab").arg(&output_file);

        let status = command.status().await.map_err(|err| {
            SourceError::SourceUnavailable {
                label: "ExternalTool".into(),
                reason: err.to_string(),
            }
        })?;
        if !status.success() {
            return Err(SourceError::SourceUnavailable {
                label: "ExternalTool".into(),
                reason: format!("tool exited with {status}"),
            });
        }

        let text = tokio::fs::read_to_string(&output_file)
            .await
            .map_err(|_| SourceError::ExternalToolOutputMissing(output_file.clone()))?;
        let _ = tokio::fs::remove_file(&output_file).await;

        Ok(text)
    }
}
