//! Progress tracking and polling for long-running ARM operations
//!
//! Writes that ARM accepts for background processing return a status URL
//! which must be polled until the operation reaches a terminal state. This
//! module provides that polling with optional progress callbacks for UI
//! updates, and the step-level events the provisioning workflow emits.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::arm::{ArmClient, ArmError, OperationPoll, OperationState, PendingOperation};
use crate::error::{CoreError, Result};

/// The resource a long-running operation is provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    ResourceGroup(String),
    StorageAccount(String),
}

impl Target {
    /// Attribute a provider error to this resource
    pub fn error(&self, source: ArmError) -> CoreError {
        if let ArmError::Credential(e) = source {
            return CoreError::Authentication(e);
        }
        match self {
            Target::ResourceGroup(name) => CoreError::ResourceGroup {
                name: name.clone(),
                source,
            },
            Target::StorageAccount(name) => CoreError::StorageAccount {
                name: name.clone(),
                source,
            },
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::ResourceGroup(name) => write!(f, "resource group {}", name),
            Target::StorageAccount(name) => write!(f, "storage account {}", name),
        }
    }
}

/// Progress events emitted while provisioning
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Subscription resolved
    SubscriptionResolved {
        subscription_id: String,
        display_name: Option<String>,
    },
    /// Resource group is absent and about to be created
    ResourceGroupCreating { name: String, region: String },
    /// Resource group already exists and is reused as-is
    ResourceGroupExists { name: String },
    /// Storage account upsert is about to be sent
    StorageAccountUpserting { name: String, resource_group: String },
    /// A long-running operation has been accepted
    Started { resource: String },
    /// Polling iteration with current status
    Polling {
        resource: String,
        status: String,
        elapsed: Duration,
    },
    /// Operation completed successfully
    Completed { resource: String },
    /// Operation failed
    Failed { resource: String, error: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to print status lines and drive a spinner.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Default time between status polls when ARM sends no `Retry-After`
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How to wait on long-running operations
#[derive(Clone)]
pub struct WaitOptions {
    /// Time between polls unless the provider asks for something else
    pub interval: Duration,
    /// Give up after this long; `None` waits until the provider finishes
    pub timeout: Option<Duration>,
    /// Optional progress callback
    pub on_progress: Option<ProgressCallback>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            on_progress: None,
        }
    }
}

impl std::fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitOptions")
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl WaitOptions {
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        emit(&self.on_progress, event);
    }
}

/// Poll an ARM operation until it reaches a terminal state
///
/// # Arguments
///
/// * `client` - The ARM client
/// * `target` - The resource being provisioned, used in events and errors
/// * `operation` - The pending operation returned by a write
/// * `options` - Interval, optional timeout and progress callback
///
/// # Returns
///
/// The final poll observation, or an error if the operation failed, was
/// canceled, or the timeout elapsed.
///
/// # Example
///
/// ```rust,ignore
/// use azprov_core::{OperationStart, Target, WaitOptions, poll_operation};
///
/// if let OperationStart::Pending(op) = client
///     .begin_create_storage_account(sub, "rg-demo", "stdemo12345", &params)
///     .await?
/// {
///     let target = Target::StorageAccount("stdemo12345".to_string());
///     poll_operation(&client, &target, &op, &WaitOptions::default()).await?;
/// }
/// ```
pub async fn poll_operation(
    client: &ArmClient,
    target: &Target,
    operation: &PendingOperation,
    options: &WaitOptions,
) -> Result<OperationPoll> {
    let start = Instant::now();
    let resource = target.to_string();

    options.emit(ProgressEvent::Started {
        resource: resource.clone(),
    });

    let mut delay = operation.retry_after.unwrap_or(options.interval);

    loop {
        // Retry-After never stretches a wait past the caller's timeout
        if let Some(timeout) = options.timeout {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(CoreError::OperationTimeout(timeout));
            }
            tokio::time::sleep(delay.min(remaining)).await;
            if start.elapsed() >= timeout {
                return Err(CoreError::OperationTimeout(timeout));
            }
        } else {
            tokio::time::sleep(delay).await;
        }

        let poll = client
            .operation_status(operation)
            .await
            .map_err(|source| target.error(source))?;
        debug!(%resource, state = %poll.state, "Operation status");

        options.emit(ProgressEvent::Polling {
            resource: resource.clone(),
            status: poll.state.to_string(),
            elapsed: start.elapsed(),
        });

        match &poll.state {
            OperationState::Succeeded => {
                options.emit(ProgressEvent::Completed {
                    resource: resource.clone(),
                });
                return Ok(poll);
            }
            OperationState::Failed | OperationState::Canceled => {
                let message = poll
                    .error
                    .as_ref()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .unwrap_or_else(|| format!("Operation ended with status {}", poll.state));

                options.emit(ProgressEvent::Failed {
                    resource: resource.clone(),
                    error: message.clone(),
                });
                return Err(CoreError::OperationFailed {
                    resource: resource.clone(),
                    state: poll.state.to_string().to_lowercase(),
                    message,
                });
            }
            OperationState::InProgress | OperationState::Other(_) => {
                delay = poll.retry_after.unwrap_or(options.interval);
            }
        }
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
