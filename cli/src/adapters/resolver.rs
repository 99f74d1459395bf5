use async_trait::async_trait;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_core::ports::HostResolver;
use tokio::process::Command;
use tracing::debug;

/// Resolver backed by the system's name lookup and ping.
pub struct SystemResolver;

const LOCAL_ALIASES: [&str; 4] = ["localhost", "127.0.0.1", "::1", "."];

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, requested: &str) -> Result<Host, SourceError> {
        let trimmed = requested.trim();
        let local_name = sys_info::hostname().unwrap_or_else(|_| "localhost".to_string());

        if trimmed.is_empty()
            || LOCAL_ALIASES.contains(&trimmed.to_ascii_lowercase().as_str())
            || trimmed.eq_ignore_ascii_case(&local_name)
        {
            return Ok(Host::local(local_name));
        }

        let mut addrs = tokio::net::lookup_host((trimmed, 0))
            .await
            .map_err(|err| {
                debug!(target: "keyscout::resolve", "{trimmed}: {err}");
                SourceError::HostUnreachable(trimmed.to_string())
            })?;
        let addr = addrs
            .next()
            .ok_or_else(|| SourceError::HostUnreachable(trimmed.to_string()))?;

        Ok(Host::remote(requested, trimmed, addr.ip()))
    }

    async fn is_reachable(&self, host: &Host) -> bool {
        let target = host
            .ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| host.hostname.clone());

        let count_args: &[&str] = if cfg!(windows) {
            &["-n", "1", "-w", "1000"]
        } else {
            &["-c", "1", "-W", "1"]
        };

        Command::new("ping")
            .args(count_args)
            .arg(&target)
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
