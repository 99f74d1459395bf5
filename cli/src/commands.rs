use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use keyscout_common::config::{Config, Credential};

#[derive(Parser)]
#[command(name = "keyscout")]
#[command(about = "Recovers Windows product keys from one or more hosts.")]
pub struct CommandLine {
    /// Hosts to query, by name or address. Defaults to this machine.
    pub hosts: Vec<String>,

    /// Suppress unreachable/error/"not found" records
    #[arg(long)]
    pub show_only_valid: bool,

    /// Never force-start the RemoteRegistry service on targets
    #[arg(long)]
    pub dont_enable_remote_registry: bool,

    /// Skip the registry DigitalProductId sources
    #[arg(long)]
    pub skip_reg_product_key: bool,

    /// Skip the two DefaultProductKey registry paths
    #[arg(long)]
    pub skip_default_product_keys: bool,

    /// Omit OEM manufacturer/model fields from output
    #[arg(long)]
    pub skip_oem_info: bool,

    /// Skip the external decoding tool source
    #[arg(long)]
    pub skip_produkey: bool,

    /// Location of the external decoding tool
    #[arg(long)]
    pub produkey_path: Option<PathBuf>,

    /// User name for remote access (requires --password-file)
    #[arg(long)]
    pub user: Option<String>,

    /// File holding the password for --user
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Upper bound in seconds for one external tool invocation
    #[arg(long, default_value_t = 30)]
    pub tool_timeout_secs: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Splits the parsed arguments into the host list and the process-wide
    /// config. Static configuration problems (an unreadable credential file,
    /// a half-specified credential) fail here, before any host is processed.
    pub fn into_parts(self) -> anyhow::Result<(Vec<String>, Config)> {
        let credential = match (self.user, self.password_file) {
            (Some(user), Some(path)) => {
                let secret = fs::read_to_string(&path)
                    .with_context(|| format!("reading password file {}", path.display()))?;
                Some(Credential::new(user, secret.trim_end()))
            }
            (Some(_), None) => bail!("--user requires --password-file"),
            (None, Some(_)) => bail!("--password-file requires --user"),
            (None, None) => None,
        };

        let hosts = if self.hosts.is_empty() {
            vec!["localhost".to_string()]
        } else {
            self.hosts
        };

        let cfg = Config {
            show_only_valid: self.show_only_valid,
            dont_enable_remote_registry: self.dont_enable_remote_registry,
            skip_reg_product_key: self.skip_reg_product_key,
            skip_default_product_keys: self.skip_default_product_keys,
            skip_oem_info: self.skip_oem_info,
            skip_produkey: self.skip_produkey,
            produkey_path: self.produkey_path,
            credential,
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
        };

        Ok((hosts, cfg))
    }
}
