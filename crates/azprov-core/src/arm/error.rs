//! Errors returned by the Resource Manager client

use serde::Deserialize;
use thiserror::Error;

use crate::credential::CredentialError;

/// Error type for ARM requests
#[derive(Error, Debug)]
pub enum ArmError {
    /// Could not obtain a bearer token
    #[error("Authentication failed: {0}")]
    Credential(#[from] CredentialError),

    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ARM answered with a non-success status
    #[error("HTTP {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A success response whose body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Endpoint or resource path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

impl ArmError {
    /// Build an [`ArmError::Api`] from a status code and raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error)
            .or_else(|_| serde_json::from_str::<ErrorDetail>(body))
            .unwrap_or_default();

        let code = if detail.code.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown")
                .to_string()
        } else {
            detail.code
        };
        let message = if detail.message.is_empty() {
            body.trim().to_string()
        } else {
            detail.message
        };

        ArmError::Api {
            status,
            code,
            message,
        }
    }

    /// HTTP status for API errors
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ArmError::Api { status, .. } => Some(*status),
            ArmError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// ARM error code, e.g. `StorageAccountAlreadyTaken`
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            ArmError::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    /// or the token could not be acquired at all
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ArmError::Credential(_)) || matches!(self.status(), Some(401 | 403))
    }

    /// Returns true if this is a conflict error (409)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if the request was throttled (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
