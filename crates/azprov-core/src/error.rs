//! Unified error handling for azprov-core
//!
//! Each provisioning step wraps the underlying ARM error with the step it
//! came from, so callers can tell an authentication problem from a resource
//! group failure from a storage account name collision.
//!
//! # Example
//!
//! ```rust
//! use azprov_core::{ArmError, CoreError};
//!
//! let err = CoreError::StorageAccount {
//!     name: "stdemo12345".to_string(),
//!     source: ArmError::from_response(
//!         409,
//!         r#"{"error":{"code":"StorageAccountAlreadyTaken","message":"taken"}}"#,
//!     ),
//! };
//! assert!(err.is_conflict());
//! assert_eq!(err.code(), Some("StorageAccountAlreadyTaken"));
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::arm::ArmError;
use crate::config::ConfigError;
use crate::credential::CredentialError;

/// Core error type for provisioning operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// No credential source could produce a token
    #[error("Authentication failed: {0}")]
    Authentication(#[from] CredentialError),

    /// The subscription could not be looked up
    #[error("Failed to resolve subscription: {0}")]
    Subscription(#[source] ArmError),

    /// The credential can see no usable subscription
    #[error("No enabled subscription is visible to the current credential")]
    NoSubscription,

    /// Resource group lookup or creation failed
    #[error("Resource group '{name}' operation failed: {source}")]
    ResourceGroup {
        name: String,
        #[source]
        source: ArmError,
    },

    /// Storage account upsert failed
    #[error("Storage account '{name}' operation failed: {source}")]
    StorageAccount {
        name: String,
        #[source]
        source: ArmError,
    },

    /// A long-running operation ended in `Failed` or `Canceled`
    #[error("{resource} operation {state}: {message}")]
    OperationFailed {
        resource: String,
        state: String,
        message: String,
    },

    /// The caller-supplied wait limit elapsed
    #[error("Timed out after {0:?} waiting for the operation to finish")]
    OperationTimeout(Duration),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    fn arm(&self) -> Option<&ArmError> {
        match self {
            CoreError::Subscription(e) => Some(e),
            CoreError::ResourceGroup { source, .. } | CoreError::StorageAccount { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    /// ARM error code of the underlying provider error, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.arm().and_then(ArmError::code)
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.arm().is_some_and(ArmError::is_not_found)
    }

    /// Returns true if this is an authentication/authorization error
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Authentication(_))
            || self.arm().is_some_and(ArmError::is_unauthorized)
    }

    /// Returns true if this is a conflict error (409), e.g. a storage account
    /// name owned by someone else
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.arm().is_some_and(ArmError::is_conflict)
    }

    /// Returns true if this is a bad request error (400) or local validation
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, CoreError::Validation(_)) || self.arm().is_some_and(ArmError::is_bad_request)
    }

    /// Returns true if this is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::OperationTimeout(_))
    }
}
