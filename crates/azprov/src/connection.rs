//! Connection management for Azure Resource Manager clients

use std::sync::Arc;
use std::time::Duration;

use azprov_core::credential::DEFAULT_AUTHORITY_HOST;
use azprov_core::{
    ArmClient, Config, DefaultAzureCredential, StaticTokenCredential, TokenCredential, WaitOptions,
};
use tracing::{debug, info};

use crate::cli::WaitArgs;
use crate::error::Result as CliResult;

/// Pre-acquired bearer token, bypassing the credential chain
pub const ACCESS_TOKEN_ENV: &str = "AZPROV_ACCESS_TOKEN";

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
    /// `--arm-endpoint` / `AZPROV_ARM_ENDPOINT`, wins over the config file
    pub arm_endpoint: Option<String>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
            arm_endpoint: None,
        }
    }

    #[must_use]
    pub fn with_arm_endpoint(mut self, arm_endpoint: Option<String>) -> Self {
        self.arm_endpoint = arm_endpoint;
        self
    }

    /// The Resource Manager endpoint requests go to
    pub fn endpoint(&self) -> &str {
        self.arm_endpoint
            .as_deref()
            .unwrap_or_else(|| self.config.arm_endpoint())
    }

    /// Create an ARM client authenticated with the best available credential
    pub fn create_arm_client(&self) -> CliResult<ArmClient> {
        let endpoint = self.endpoint();
        debug!("Creating ARM client for {}", endpoint);
        let client = ArmClient::new(self.credential(), endpoint)?;
        Ok(client)
    }

    fn credential(&self) -> Arc<dyn TokenCredential> {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
            && !token.is_empty()
        {
            info!("Using access token from {}", ACCESS_TOKEN_ENV);
            return Arc::new(StaticTokenCredential::new(token));
        }

        match self.config.authority_host.as_deref() {
            Some(host) if host != DEFAULT_AUTHORITY_HOST => {
                debug!("Using authority host {} from config", host);
                Arc::new(DefaultAzureCredential::with_authority_host(host))
            }
            _ => Arc::new(DefaultAzureCredential::new()),
        }
    }

    /// Polling options for long-running operations
    pub fn wait_options(&self, wait: &WaitArgs) -> WaitOptions {
        let interval = wait
            .poll_interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.poll_interval());

        WaitOptions::default()
            .with_interval(interval)
            .with_timeout(wait.wait_timeout.map(Duration::from_secs))
    }
}
