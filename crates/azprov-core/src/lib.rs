//! # azprov-core
//!
//! The engine behind the `azprov` CLI: it ensures an Azure resource group
//! exists and then creates or updates a storage account inside it, talking
//! to Azure Resource Manager (ARM) over its REST API.
//!
//! ## Layers
//!
//! - **[`credential`]** - Entra ID access tokens from service principal
//!   environment variables, managed identity, or the Azure CLI login
//! - **[`arm`]** - single-request ARM operations and the long-running
//!   operation protocol
//! - **[`progress`]** - polling pending operations with progress callbacks
//! - **[`provision`]** - the multi-step workflow built on the layers above
//! - **[`config`]** - the optional TOML config file
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use azprov_core::{
//!     ArmClient, DEFAULT_ENDPOINT, DefaultAzureCredential, ProvisionRequest, WaitOptions,
//!     provision,
//! };
//!
//! let client = ArmClient::new(Arc::new(DefaultAzureCredential::new()), DEFAULT_ENDPOINT)?;
//! let request = ProvisionRequest::new("rg-demo", "stdemo12345", "eastus");
//! let outcome = provision(&client, &request, &WaitOptions::default()).await?;
//! ```

pub mod arm;
pub mod config;
pub mod credential;
pub mod error;
pub mod progress;
pub mod provision;

pub use arm::{
    ArmClient, ArmError, DEFAULT_ENDPOINT, OperationStart, OperationState, ResourceGroup,
    StorageAccount, Subscription,
};
pub use config::Config;
pub use credential::{
    AccessToken, CredentialError, DefaultAzureCredential, StaticTokenCredential, TokenCredential,
};
pub use error::{CoreError, Result};
pub use progress::{
    DEFAULT_POLL_INTERVAL, ProgressCallback, ProgressEvent, Target, WaitOptions, poll_operation,
};
pub use provision::{
    EnsuredResourceGroup, ProvisionInputs, ProvisionOutcome, ProvisionRequest,
    create_storage_account, ensure_resource_group, provision, resolve_subscription,
};
