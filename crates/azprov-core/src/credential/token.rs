//! Access tokens and the credential capability

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use super::error::CredentialError;

/// A bearer token together with its expiry, if the issuer reported one
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// True when the token expires within `margin` from now. Tokens without
    /// a known expiry never expire.
    #[must_use]
    pub fn expires_within(&self, margin: Duration) -> bool {
        match self.expires_on {
            Some(expires_on) => expires_on - margin <= Utc::now(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Anything that can produce a bearer token for the given scopes
#[async_trait]
pub trait TokenCredential: Send + Sync + std::fmt::Debug {
    /// Short human-readable name used in logs and errors
    fn name(&self) -> &'static str;

    /// Acquire a token valid for `scopes`
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError>;
}

/// A credential that always returns the same token
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, None),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &'static str {
        "StaticTokenCredential"
    }

    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        Ok(self.token.clone())
    }
}

/// OAuth2 token response shared by Entra ID and the managed identity
/// endpoints. IMDS sends numbers as strings, Entra ID as integers.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub expires_on: Option<i64>,
}

impl TokenResponse {
    pub fn into_access_token(self) -> AccessToken {
        let expires_on = self
            .expires_on
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs))
            });
        AccessToken::new(self.access_token, expires_on)
    }
}

/// Error body returned by Entra ID and IMDS
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    pub fn describe(body: &str) -> String {
        let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap_or_default();
        match (parsed.error, parsed.error_description) {
            (Some(code), Some(description)) => format!("{}: {}", code, description),
            (Some(code), None) => code,
            (None, Some(description)) => description,
            (None, None) if body.is_empty() => "empty response".to_string(),
            (None, None) => body.to_string(),
        }
    }
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
