//! Token source backed by the Azure CLI login

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::error::CredentialError;
use super::scope_to_resource;
use super::token::{AccessToken, TokenCredential, lenient_i64};

const NAME: &str = "AzureCliCredential";

#[cfg(windows)]
const AZ_PROGRAM: &str = "az.cmd";
#[cfg(not(windows))]
const AZ_PROGRAM: &str = "az";

const CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Reuses whatever account `az login` signed in with
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
    tenant_id: Option<String>,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: AZ_PROGRAM.to_string(),
            tenant_id: None,
        }
    }

    /// Request the token for a specific tenant
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Use a different executable (wrapper scripts, tests)
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// Output of `az account get-access-token --output json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Local time, e.g. `2024-01-31 14:03:12.000000`
    #[serde(default)]
    expires_on: Option<String>,
    /// Epoch seconds, only emitted by newer CLI versions
    #[serde(default, rename = "expires_on", deserialize_with = "lenient_i64")]
    expires_on_epoch: Option<i64>,
}

impl CliToken {
    fn expiry(&self) -> Option<DateTime<Utc>> {
        if let Some(secs) = self.expires_on_epoch {
            return Utc.timestamp_opt(secs, 0).single();
        }
        let raw = self.expires_on.as_deref()?;
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }
}

pub(crate) fn parse_cli_output(stdout: &str) -> Result<AccessToken, CredentialError> {
    let parsed: CliToken = serde_json::from_str(stdout)
        .map_err(|e| CredentialError::failed(NAME, format!("unexpected az output: {}", e)))?;
    let expires_on = parsed.expiry();
    Ok(AccessToken::new(parsed.access_token, expires_on))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let scope = scopes
            .first()
            .ok_or_else(|| CredentialError::failed(NAME, "no scope requested"))?;
        let resource = scope_to_resource(scope);

        let mut command = Command::new(&self.program);
        command
            .args(["account", "get-access-token", "--output", "json", "--resource"])
            .arg(resource)
            .kill_on_drop(true);
        if let Some(tenant) = &self.tenant_id {
            command.args(["--tenant", tenant]);
        }

        debug!(program = %self.program, %resource, "Requesting token from Azure CLI");

        let output = match tokio::time::timeout(CLI_TIMEOUT, command.output()).await {
            Err(_) => {
                return Err(CredentialError::failed(
                    NAME,
                    format!("az did not respond within {}s", CLI_TIMEOUT.as_secs()),
                ));
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(CredentialError::unavailable(
                    NAME,
                    "Azure CLI not found on PATH",
                ));
            }
            Ok(Err(e)) => return Err(CredentialError::unavailable(NAME, e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("az login") || stderr.contains("az account set") {
                return Err(CredentialError::unavailable(
                    NAME,
                    "not logged in, run 'az login'",
                ));
            }
            return Err(CredentialError::failed(NAME, stderr));
        }

        parse_cli_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_output_prefers_epoch() {
        let stdout = r#"{
            "accessToken": "cli-token",
            "expiresOn": "2023-10-31 14:03:12.000000",
            "expires_on": 1698760992,
            "subscription": "00000000-0000-0000-0000-000000000000",
            "tenant": "11111111-1111-1111-1111-111111111111",
            "tokenType": "Bearer"
        }"#;

        let token = parse_cli_output(stdout).unwrap();
        assert_eq!(token.token, "cli-token");
        assert_eq!(token.expires_on.unwrap().timestamp(), 1_698_760_992);
    }

    #[test]
    fn test_parse_cli_output_local_time() {
        let stdout = r#"{"accessToken": "cli-token", "expiresOn": "2023-10-31 14:03:12.000000"}"#;
        let token = parse_cli_output(stdout).unwrap();
        assert!(token.expires_on.is_some());
    }

    #[test]
    fn test_parse_cli_output_garbage() {
        let err = parse_cli_output("ERROR: something").unwrap_err();
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let credential = AzureCliCredential::new().with_program("azprov-definitely-not-installed");
        let err = credential
            .get_token(&["https://management.azure.com/.default"])
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
