//! Service principal credential read from the environment

use async_trait::async_trait;
use std::env;
use tracing::debug;

use super::error::CredentialError;
use super::token::{AccessToken, TokenCredential, TokenErrorResponse, TokenResponse};
use super::DEFAULT_AUTHORITY_HOST;

const NAME: &str = "EnvironmentCredential";

/// Client-credentials grant for a service principal
///
/// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`, and
/// honours `AZURE_AUTHORITY_HOST` for sovereign clouds.
#[derive(Clone)]
pub struct EnvironmentCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for EnvironmentCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

impl EnvironmentCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Build from the standard environment variables
    ///
    /// Returns [`CredentialError::Unavailable`] naming the first missing
    /// variable.
    pub fn from_env() -> Result<Self, CredentialError> {
        let tenant_id = require_var("AZURE_TENANT_ID")?;
        let client_id = require_var("AZURE_CLIENT_ID")?;
        let client_secret = require_var("AZURE_CLIENT_SECRET")?;

        let mut credential = Self::new(tenant_id, client_id, client_secret);
        if let Ok(host) = env::var("AZURE_AUTHORITY_HOST")
            && !host.is_empty()
        {
            credential = credential.with_authority_host(host);
        }
        Ok(credential)
    }

    /// Override the Entra ID authority (sovereign clouds, tests)
    #[must_use]
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into().trim_end_matches('/').to_string();
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        )
    }
}

fn require_var(name: &str) -> Result<String, CredentialError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(CredentialError::unavailable(
            NAME,
            format!("environment variable {} is not set", name),
        )),
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let scope = scopes.join(" ");
        let form = serde_urlencoded::to_string([
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ])
        .map_err(|e| CredentialError::failed(NAME, e.to_string()))?;

        debug!(tenant = %self.tenant_id, client_id = %self.client_id, "Requesting service principal token");

        let response = self
            .http
            .post(self.token_url())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form)
            .send()
            .await
            .map_err(|e| CredentialError::unavailable(NAME, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::failed(NAME, e.to_string()))?;

        if !status.is_success() {
            return Err(CredentialError::failed(
                NAME,
                format!("HTTP {}: {}", status.as_u16(), TokenErrorResponse::describe(&body)),
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CredentialError::failed(NAME, format!("invalid token response: {}", e)))?;
        Ok(parsed.into_access_token())
    }
}
