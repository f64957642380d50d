//! Error types for credential acquisition

use thiserror::Error;

/// Errors raised while acquiring an access token
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The source cannot be used in this environment (missing variables,
    /// no metadata endpoint, CLI not installed or not logged in)
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        source_name: &'static str,
        message: String,
    },

    /// The source was reachable but refused to issue a token
    #[error("{source_name} authentication failed: {message}")]
    AuthenticationFailed {
        source_name: &'static str,
        message: String,
    },

    /// Every source in a credential chain failed
    #[error("no credential source could provide a token:\n{}", summarize(.0))]
    ChainExhausted(Vec<CredentialError>),
}

impl CredentialError {
    /// Shorthand for [`CredentialError::Unavailable`]
    pub fn unavailable(source_name: &'static str, message: impl Into<String>) -> Self {
        CredentialError::Unavailable {
            source_name,
            message: message.into(),
        }
    }

    /// Shorthand for [`CredentialError::AuthenticationFailed`]
    pub fn failed(source_name: &'static str, message: impl Into<String>) -> Self {
        CredentialError::AuthenticationFailed {
            source_name,
            message: message.into(),
        }
    }

    /// Returns true if the source simply does not apply here, as opposed to
    /// a source that applied and rejected us
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            CredentialError::Unavailable { .. } => true,
            CredentialError::ChainExhausted(errors) => errors.iter().all(Self::is_unavailable),
            CredentialError::AuthenticationFailed { .. } => false,
        }
    }
}

fn summarize(errors: &[CredentialError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_exhausted_lists_every_source() {
        let err = CredentialError::ChainExhausted(vec![
            CredentialError::unavailable("EnvironmentCredential", "AZURE_TENANT_ID not set"),
            CredentialError::failed("AzureCliCredential", "token expired"),
        ]);

        let msg = err.to_string();
        assert!(msg.contains("EnvironmentCredential unavailable: AZURE_TENANT_ID not set"));
        assert!(msg.contains("AzureCliCredential authentication failed: token expired"));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_unavailable_chain() {
        let err = CredentialError::ChainExhausted(vec![CredentialError::unavailable(
            "ManagedIdentityCredential",
            "no endpoint",
        )]);
        assert!(err.is_unavailable());
    }
}
