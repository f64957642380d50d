//! Azure Resource Manager access
//!
//! A thin REST client over `management.azure.com` covering subscriptions,
//! resource groups and storage accounts, plus the long-running operation
//! protocol ARM uses for writes. Higher-level "create and wait" logic lives in
//! [`crate::provision`].

pub mod client;
pub mod error;
pub mod models;
pub mod operation;

pub use client::{ArmClient, DEFAULT_ENDPOINT};
pub use error::{ArmError, ErrorDetail};
pub use models::*;
pub use operation::{OperationPoll, OperationStart, OperationState, PendingOperation, StatusKind};
