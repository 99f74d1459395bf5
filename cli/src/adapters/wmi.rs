//! # CIM / Registry Management Client
//!
//! Implements the management interface by shelling out to the platform
//! tools: PowerShell CIM cmdlets for licensing and inventory queries,
//! `reg.exe` for registry values (which honors the RemoteRegistry service
//! the lease manages), and `sc.exe` for service control.
//!
//! Remote credentials are passed to PowerShell through an environment
//! variable so the secret never appears on a command line.

use async_trait::async_trait;
use keyscout_common::config::Credential;
use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::license::{HostInfo, LicensingProduct, ServiceState};
use keyscout_core::ports::{LicensingQuery, ManagementClient};
use tokio::process::Command;

const PASSWORD_ENV: &str = "KEYSCOUT_PW";

pub struct CimClient {
    credential: Option<Credential>,
}

impl CimClient {
    pub fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }

    /// PowerShell prelude defining `$cred` when a credential applies, plus
    /// the argument snippet appended to each CIM call.
    fn cim_context(&self, host: &Host) -> (String, String) {
        if host.is_local {
            return (String::new(), String::new());
        }
        match &self.credential {
            Some(cred) => (
                format!(
                    "$sec = ConvertTo-SecureString $env:{PASSWORD_ENV} -AsPlainText -Force; \
                     $cred = New-Object System.Management.Automation.PSCredential('{}', $sec); ",
                    cred.username
                ),
                format!(" -ComputerName '{}' -Credential $cred", host.hostname),
            ),
            None => (
                String::new(),
                format!(" -ComputerName '{}'", host.hostname),
            ),
        }
    }

    async fn powershell(&self, script: String) -> Result<String, String> {
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", script.as_str()]);
        if let Some(cred) = &self.credential {
            command.env(PASSWORD_ENV, cred.secret());
        }
        run(command).await
    }

    fn reg_root(host: &Host, path: &str) -> String {
        if host.is_local {
            format!(r"HKLM\{path}")
        } else {
            format!(r"\\{}\HKLM\{}", host.hostname, path)
        }
    }

    async fn reg_query(
        &self,
        host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, SourceError> {
        let root = Self::reg_root(host, path);
        let mut command = Command::new("reg");
        command.args(["query", root.as_str(), "/v", name]);

        match run(command).await {
            Ok(stdout) => Ok(Some(stdout)),
            Err(message) => {
                let lowered = message.to_lowercase();
                // reg.exe reports an absent value through a non-zero exit.
                if lowered.contains("unable to find") {
                    return Ok(None);
                }
                if lowered.contains("access is denied") {
                    return Err(SourceError::NoRegistryAccess(host.hostname.clone()));
                }
                Err(SourceError::SourceUnavailable {
                    label: "registry".into(),
                    reason: message,
                })
            }
        }
    }

    async fn sc_exec(&self, host: &Host, verb: &str, service: &str) -> Result<String, SourceError> {
        let mut command = Command::new("sc");
        if !host.is_local {
            command.arg(format!(r"\\{}", host.hostname));
        }
        command.args([verb, service]);

        run(command)
            .await
            .map_err(|message| SourceError::SourceUnavailable {
                label: "service control".into(),
                reason: message,
            })
    }
}

#[async_trait]
impl ManagementClient for CimClient {
    async fn query_host_info(&self, host: &Host) -> Result<HostInfo, SourceError> {
        let (prelude, arg) = self.cim_context(host);
        let script = format!(
            "{prelude}\
             $cs = Get-CimInstance Win32_ComputerSystem{arg}; \
             $os = Get-CimInstance Win32_OperatingSystem{arg}; \
             $bios = Get-CimInstance Win32_BIOS{arg}; \
             '{{0}}\t{{1}}\t{{2}}\t{{3}}\t{{4}}\t{{5}}' -f \
             $cs.Name, $os.Caption, $os.Version, $cs.Manufacturer, $cs.Model, $bios.SerialNumber"
        );

        let unavailable = |reason: String| SourceError::ManagementUnavailable {
            host: host.hostname.clone(),
            reason,
        };

        let stdout = self.powershell(script).await.map_err(unavailable)?;
        let line = stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| unavailable("empty inventory response".into()))?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 6 {
            return Err(unavailable(format!("unexpected inventory response: {line}")));
        }

        Ok(HostInfo {
            computer_name: fields[0].trim().to_string(),
            os_caption: fields[1].trim().to_string(),
            os_version: fields[2].trim().to_string(),
            manufacturer: fields[3].trim().to_string(),
            model: fields[4].trim().to_string(),
            serial_number: fields[5].trim().to_string(),
        })
    }

    async fn query_licensing_products(
        &self,
        host: &Host,
        query: LicensingQuery,
    ) -> Result<Vec<LicensingProduct>, SourceError> {
        let class = match query {
            LicensingQuery::SoftwareLicensingProduct => "SoftwareLicensingProduct",
            LicensingQuery::OfficeSoftwareProtection => "OfficeSoftwareProtectionProduct",
        };
        let (prelude, arg) = self.cim_context(host);
        let script = format!(
            "{prelude}\
             Get-CimInstance -ClassName {class}{arg} | ForEach-Object {{ \
             '{{0}}\t{{1}}\t{{2}}\t{{3}}' -f $_.Name, $_.ID, $_.PartialProductKey, $_.LicenseStatus }}"
        );

        let stdout =
            self.powershell(script)
                .await
                .map_err(|reason| SourceError::SourceUnavailable {
                    label: class.into(),
                    reason,
                })?;

        let mut products = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 4 {
                continue;
            }
            let partial = fields[2].trim();
            products.push(LicensingProduct {
                name: fields[0].trim().to_string(),
                product_id: fields[1].trim().to_string(),
                partial_key: (!partial.is_empty()).then(|| partial.to_string()),
                license_status: fields[3].trim().parse().ok(),
            });
        }
        Ok(products)
    }

    async fn query_original_product_key(
        &self,
        host: &Host,
    ) -> Result<Option<String>, SourceError> {
        let (prelude, arg) = self.cim_context(host);
        let script = format!(
            "{prelude}(Get-CimInstance -ClassName SoftwareLicensingService{arg}).OA3xOriginalProductKey"
        );

        let stdout =
            self.powershell(script)
                .await
                .map_err(|reason| SourceError::SourceUnavailable {
                    label: "SoftwareLicensingService".into(),
                    reason,
                })?;

        let key = stdout.trim();
        Ok((!key.is_empty()).then(|| key.to_string()))
    }

    async fn read_binary_value(
        &self,
        host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, SourceError> {
        let Some(stdout) = self.reg_query(host, path, name).await? else {
            return Ok(None);
        };

        for line in stdout.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() == 3 && tokens[0] == name && tokens[1] == "REG_BINARY" {
                return Ok(decode_hex(tokens[2]));
            }
        }
        Ok(None)
    }

    async fn read_string_value(
        &self,
        host: &Host,
        path: &str,
        name: &str,
    ) -> Result<Option<String>, SourceError> {
        let Some(stdout) = self.reg_query(host, path, name).await? else {
            return Ok(None);
        };

        for line in stdout.lines() {
            if let Some((head, value)) = line.split_once("REG_SZ") {
                if head.trim().starts_with(name) {
                    return Ok(Some(value.trim().to_string()));
                }
            }
        }
        Ok(None)
    }

    async fn query_service_state(
        &self,
        host: &Host,
        service: &str,
    ) -> Result<ServiceState, SourceError> {
        let stdout = self.sc_exec(host, "query", service).await?;
        let state_line = stdout
            .lines()
            .find(|line| line.trim_start().starts_with("STATE"))
            .unwrap_or("");

        if state_line.contains("RUNNING") {
            Ok(ServiceState::Running)
        } else if state_line.contains("STOPPED") {
            Ok(ServiceState::Stopped)
        } else {
            Ok(ServiceState::Other(state_line.trim().to_string()))
        }
    }

    async fn set_service_state(
        &self,
        host: &Host,
        service: &str,
        state: ServiceState,
    ) -> Result<(), SourceError> {
        let verb = match state {
            ServiceState::Running => "start",
            _ => "stop",
        };
        self.sc_exec(host, verb, service).await.map(|_| ())
    }
}

async fn run(mut command: Command) -> Result<String, String> {
    let output = command.output().await.map_err(|err| err.to_string())?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(message.trim().to_string());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    // Byte chunks, not string slices: a corrupt token with multibyte
    // characters must decode to None, never split a char boundary.
    if !s.is_ascii() || s.len() % 2 != 0 {
        return None;
    }
    s.as_bytes()
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).ok()?, 16).ok())
        .collect()
}
