//! Managed identity credential (IMDS and App Service identity endpoint)

use async_trait::async_trait;
use std::env;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::CredentialError;
use super::scope_to_resource;
use super::token::{AccessToken, TokenCredential, TokenErrorResponse, TokenResponse};

const NAME: &str = "ManagedIdentityCredential";

/// Instance Metadata Service token endpoint
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Kept short so the credential chain moves on quickly off Azure
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
enum Endpoint {
    Imds(String),
    AppService { url: String, header: String },
}

/// Token source for workloads running on Azure compute
#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    endpoint: Endpoint,
    client_id: Option<String>,
    http: reqwest::Client,
}

impl Default for ManagedIdentityCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedIdentityCredential {
    /// Pick the endpoint from the environment
    ///
    /// `IDENTITY_ENDPOINT` + `IDENTITY_HEADER` select the App Service flavour,
    /// anything else falls back to IMDS. `AZURE_CLIENT_ID` selects a
    /// user-assigned identity.
    pub fn new() -> Self {
        let endpoint = match (env::var("IDENTITY_ENDPOINT"), env::var("IDENTITY_HEADER")) {
            (Ok(url), Ok(header)) if !url.is_empty() && !header.is_empty() => {
                Endpoint::AppService { url, header }
            }
            _ => Endpoint::Imds(IMDS_ENDPOINT.to_string()),
        };
        let client_id = env::var("AZURE_CLIENT_ID").ok().filter(|v| !v.is_empty());
        Self::with_endpoint(endpoint, client_id)
    }

    /// Use an explicit IMDS-compatible endpoint
    pub fn imds(endpoint: impl Into<String>) -> Self {
        Self::with_endpoint(Endpoint::Imds(endpoint.into()), None)
    }

    /// Select a user-assigned identity by client id
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    fn with_endpoint(endpoint: Endpoint, client_id: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            endpoint,
            client_id,
            http,
        }
    }

    fn request(&self, resource: &str) -> Result<reqwest::RequestBuilder, CredentialError> {
        let (base, api_version) = match &self.endpoint {
            Endpoint::Imds(url) => (url.as_str(), IMDS_API_VERSION),
            Endpoint::AppService { url, .. } => (url.as_str(), APP_SERVICE_API_VERSION),
        };

        let mut url = Url::parse(base).map_err(|e| {
            CredentialError::unavailable(NAME, format!("invalid identity endpoint '{}': {}", base, e))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", api_version);
            query.append_pair("resource", resource);
            if let Some(client_id) = &self.client_id {
                query.append_pair("client_id", client_id);
            }
        }

        let builder = self.http.get(url);
        Ok(match &self.endpoint {
            Endpoint::Imds(_) => builder.header("Metadata", "true"),
            Endpoint::AppService { header, .. } => builder.header("X-IDENTITY-HEADER", header),
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let scope = scopes
            .first()
            .ok_or_else(|| CredentialError::failed(NAME, "no scope requested"))?;
        let resource = scope_to_resource(scope);

        debug!(endpoint = ?self.endpoint, %resource, "Requesting managed identity token");

        // Connection failures mean there is no identity endpoint here at all
        let response = self
            .request(resource)?
            .send()
            .await
            .map_err(|e| CredentialError::unavailable(NAME, format!("no identity endpoint: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::failed(NAME, e.to_string()))?;

        match status.as_u16() {
            200..=299 => {
                let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
                    CredentialError::failed(NAME, format!("invalid token response: {}", e))
                })?;
                Ok(parsed.into_access_token())
            }
            // IMDS answers 400 when the VM has no identity assigned
            400 | 404 => Err(CredentialError::unavailable(
                NAME,
                TokenErrorResponse::describe(&body),
            )),
            code => Err(CredentialError::failed(
                NAME,
                format!("HTTP {}: {}", code, TokenErrorResponse::describe(&body)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_imds_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .and(header("Metadata", "true"))
            .and(query_param("api-version", "2018-02-01"))
            .and(query_param("resource", "https://management.azure.com"))
            .and(query_param("client_id", "uami-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "mi-token",
                "expires_on": "1700000000",
                "expires_in": "86399",
                "resource": "https://management.azure.com",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::imds(format!(
            "{}/metadata/identity/oauth2/token",
            server.uri()
        ))
        .with_client_id("uami-1");

        let token = credential
            .get_token(&["https://management.azure.com/.default"])
            .await
            .unwrap();

        assert_eq!(token.token, "mi-token");
        assert_eq!(token.expires_on.unwrap().timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_imds_without_identity_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata/identity/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_request",
                "error_description": "Identity not found"
            })))
            .mount(&server)
            .await;

        let credential = ManagedIdentityCredential::imds(format!(
            "{}/metadata/identity/oauth2/token",
            server.uri()
        ));
        let err = credential
            .get_token(&["https://management.azure.com/.default"])
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("Identity not found"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Port 9 (discard) is not listening on loopback in test environments
        let credential =
            ManagedIdentityCredential::imds("http://127.0.0.1:9/metadata/identity/oauth2/token");
        let err = credential
            .get_token(&["https://management.azure.com/.default"])
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
    }
}
