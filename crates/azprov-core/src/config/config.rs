//! Configuration file handling for azprov
//!
//! Settings live in a small TOML file. Every key is optional; command-line
//! flags and environment variables take precedence over the file.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{ConfigError, Result};
use crate::arm::DEFAULT_ENDPOINT;
use crate::progress::DEFAULT_POLL_INTERVAL;

/// Contents of `config.toml`
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Subscription to provision into; the first enabled one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    /// Globally unique, 3-24 lowercase letters and digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account: Option<String>,
    /// Azure region code, e.g. `eastus`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Resource Manager endpoint for sovereign clouds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_endpoint: Option<String>,
    /// Entra ID authority for service principal logins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Resource Manager endpoint, falling back to the public cloud
    pub fn arm_endpoint(&self) -> &str {
        self.arm_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Interval between operation status polls
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        // On macOS, check for Linux-style path first for cross-platform consistency
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("azprov")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("com", "azprov", "azprov").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax. Unset variables without a
    /// default are left as-is.
    ///
    /// Example:
    /// ```toml
    /// subscription_id = "${AZURE_SUBSCRIPTION_ID}"
    /// region = "${AZPROV_REGION:-eastus}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_round_trip() {
        let config = Config {
            subscription_id: Some("00000000-0000-0000-0000-000000000000".to_string()),
            resource_group: Some("rg-demo".to_string()),
            storage_account: Some("stdemo12345".to_string()),
            region: Some("eastus".to_string()),
            ..Default::default()
        };

        let serialized = toml::to_string(&config).unwrap();
        assert!(!serialized.contains("arm_endpoint"));
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.arm_endpoint(), "https://management.azure.com");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion_with_defaults() {
        unsafe {
            std::env::set_var("AZPROV_TEST_GROUP", "rg-from-env");
            std::env::remove_var("AZPROV_TEST_MISSING");
        }

        let content = r#"
resource_group = "${AZPROV_TEST_GROUP}"
region = "${AZPROV_TEST_MISSING:-westeurope}"
storage_account = "${AZPROV_TEST_MISSING}"
"#;

        let expanded = Config::expand_env_vars(content);
        assert!(expanded.contains("rg-from-env"));
        assert!(expanded.contains("westeurope"));
        assert!(expanded.contains("${AZPROV_TEST_MISSING}"));

        unsafe {
            std::env::remove_var("AZPROV_TEST_GROUP");
        }
    }
}
