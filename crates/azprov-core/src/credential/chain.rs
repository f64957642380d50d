//! Ordered credential chain

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use super::azure_cli::AzureCliCredential;
use super::environment::EnvironmentCredential;
use super::error::CredentialError;
use super::managed_identity::ManagedIdentityCredential;
use super::token::{AccessToken, TokenCredential};

/// A source that could not even be constructed, reported when the chain runs
#[derive(Debug)]
struct UnavailableSource {
    source_name: &'static str,
    message: String,
}

impl From<CredentialError> for UnavailableSource {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Unavailable {
                source_name,
                message,
            }
            | CredentialError::AuthenticationFailed {
                source_name,
                message,
            } => Self {
                source_name,
                message,
            },
            other => Self {
                source_name: "UnavailableSource",
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl TokenCredential for UnavailableSource {
    fn name(&self) -> &'static str {
        self.source_name
    }

    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        Err(CredentialError::unavailable(
            self.source_name,
            self.message.clone(),
        ))
    }
}

/// Tries each source in order and sticks with the first one that works
///
/// The default order is environment, managed identity, Azure CLI. Once a
/// source has produced a token, later calls go straight to it.
#[derive(Debug)]
pub struct DefaultAzureCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
    selected: OnceLock<usize>,
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultAzureCredential {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Like [`DefaultAzureCredential::new`] but service principal logins go
    /// to `authority_host` unless `AZURE_AUTHORITY_HOST` says otherwise
    pub fn with_authority_host(authority_host: &str) -> Self {
        Self::build(Some(authority_host))
    }

    fn build(authority_host: Option<&str>) -> Self {
        let environment: Arc<dyn TokenCredential> = match EnvironmentCredential::from_env() {
            Ok(credential) => match authority_host {
                Some(host) if std::env::var_os("AZURE_AUTHORITY_HOST").is_none() => {
                    Arc::new(credential.with_authority_host(host))
                }
                _ => Arc::new(credential),
            },
            Err(e) => Arc::new(UnavailableSource::from(e)),
        };

        Self::with_sources(vec![
            environment,
            Arc::new(ManagedIdentityCredential::new()),
            Arc::new(AzureCliCredential::new()),
        ])
    }

    /// Build a chain from explicit sources, tried in the given order
    pub fn with_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            selected: OnceLock::new(),
        }
    }

    /// Name of the source that produced the last token, if any has yet
    pub fn selected_source(&self) -> Option<&'static str> {
        self.selected
            .get()
            .and_then(|index| self.sources.get(*index))
            .map(|source| source.name())
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    fn name(&self) -> &'static str {
        "DefaultAzureCredential"
    }

    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        if let Some(index) = self.selected.get() {
            return self.sources[*index].get_token(scopes).await;
        }

        let mut errors = Vec::with_capacity(self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            match source.get_token(scopes).await {
                Ok(token) => {
                    info!("Authenticated with {}", source.name());
                    let _ = self.selected.set(index);
                    return Ok(token);
                }
                Err(e) => {
                    debug!("{} failed: {}", source.name(), e);
                    errors.push(e);
                }
            }
        }

        Err(CredentialError::ChainExhausted(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticTokenCredential;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenCredential for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }

        async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CredentialError::unavailable("Failing", "not here"))
        }
    }

    #[tokio::test]
    async fn test_first_successful_source_wins_and_is_remembered() {
        let failing = Arc::new(Failing::default());
        let chain = DefaultAzureCredential::with_sources(vec![
            failing.clone(),
            Arc::new(StaticTokenCredential::new("second")),
            Arc::new(StaticTokenCredential::new("third")),
        ]);

        assert!(chain.selected_source().is_none());

        let token = chain.get_token(&["scope"]).await.unwrap();
        assert_eq!(token.token, "second");
        assert_eq!(chain.selected_source(), Some("StaticTokenCredential"));

        chain.get_token(&["scope"]).await.unwrap();
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_sources_failing_reports_each() {
        let chain = DefaultAzureCredential::with_sources(vec![
            Arc::new(Failing::default()),
            Arc::new(UnavailableSource::from(CredentialError::unavailable(
                "EnvironmentCredential",
                "environment variable AZURE_TENANT_ID is not set",
            ))),
        ]);

        let err = chain.get_token(&["scope"]).await.unwrap_err();
        match &err {
            CredentialError::ChainExhausted(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("AZURE_TENANT_ID"));
        assert!(err.is_unavailable());
    }
}
