//! Credential discovery for Azure Resource Manager
//!
//! Everything that talks to ARM depends on a single capability: a
//! [`TokenCredential`] that can hand out a bearer token for a set of scopes.
//! The concrete sources live in their own modules and are chained together by
//! [`DefaultAzureCredential`]:
//!
//! 1. [`EnvironmentCredential`] - service principal from `AZURE_TENANT_ID`,
//!    `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`
//! 2. [`ManagedIdentityCredential`] - instance metadata service or App Service
//!    identity endpoint
//! 3. [`AzureCliCredential`] - `az account get-access-token`
//!
//! [`StaticTokenCredential`] wraps a pre-acquired token and is mostly useful
//! for tests and CI pipelines that already hold a token.

pub mod azure_cli;
pub mod chain;
pub mod environment;
pub mod error;
pub mod managed_identity;
pub mod token;

pub use azure_cli::AzureCliCredential;
pub use chain::DefaultAzureCredential;
pub use environment::EnvironmentCredential;
pub use error::CredentialError;
pub use managed_identity::ManagedIdentityCredential;
pub use token::{AccessToken, StaticTokenCredential, TokenCredential};

/// Default Microsoft Entra ID authority
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Convert a `.default` scope into the bare resource URI expected by the
/// managed identity endpoints and the Azure CLI.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}
