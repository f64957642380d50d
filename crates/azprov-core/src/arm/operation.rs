//! Long-running operation handles
//!
//! A write against ARM either finishes inline (200/201 with the resource in
//! the body) or is accepted for background processing (202, or 201 with an
//! `Azure-AsyncOperation` header). In the second case the response headers
//! tell us where to poll.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use super::error::{ArmError, ErrorDetail};

pub const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
pub const LOCATION: &str = "location";
pub const RETRY_AFTER: &str = "retry-after";

/// How the status URL reports progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// `Azure-AsyncOperation`: body carries a `status` field
    AsyncOperation,
    /// `Location`: 202 while running, 200/201/204 when done
    Location,
}

/// An accepted operation that still has to be polled
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub status_url: Url,
    pub kind: StatusKind,
    pub retry_after: Option<Duration>,
}

impl PendingOperation {
    /// Extract the polling target from response headers
    ///
    /// `Azure-AsyncOperation` is preferred over `Location`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let retry_after = retry_after(headers);
        let (value, kind) = header_str(headers, AZURE_ASYNC_OPERATION)
            .map(|v| (v, StatusKind::AsyncOperation))
            .or_else(|| header_str(headers, LOCATION).map(|v| (v, StatusKind::Location)))?;

        let status_url = Url::parse(value).ok()?;
        Some(Self {
            status_url,
            kind,
            retry_after,
        })
    }
}

/// Result of starting a write: either the finished resource or a handle
#[derive(Debug, Clone)]
pub enum OperationStart<T> {
    Done(T),
    Pending(PendingOperation),
}

/// Provisioning/operation state as ARM reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    /// Any non-terminal provider-specific state, e.g. `Accepted`, `Creating`
    Other(String),
}

impl OperationState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationState::Succeeded | OperationState::Failed | OperationState::Canceled
        )
    }
}

impl From<&str> for OperationState {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "inprogress" | "running" => OperationState::InProgress,
            "succeeded" => OperationState::Succeeded,
            "failed" => OperationState::Failed,
            "canceled" | "cancelled" => OperationState::Canceled,
            _ => OperationState::Other(value.to_string()),
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::InProgress => write!(f, "InProgress"),
            OperationState::Succeeded => write!(f, "Succeeded"),
            OperationState::Failed => write!(f, "Failed"),
            OperationState::Canceled => write!(f, "Canceled"),
            OperationState::Other(state) => write!(f, "{}", state),
        }
    }
}

/// One observation of a pending operation
#[derive(Debug, Clone)]
pub struct OperationPoll {
    pub state: OperationState,
    pub error: Option<ErrorDetail>,
    pub retry_after: Option<Duration>,
}

/// Body of an `Azure-AsyncOperation` status resource
#[derive(Debug, Deserialize)]
pub(crate) struct AsyncOperationBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

impl AsyncOperationBody {
    pub fn into_poll(self, retry_after: Option<Duration>) -> Result<OperationPoll, ArmError> {
        let status = self
            .status
            .ok_or_else(|| ArmError::Decode("operation status without a 'status' field".into()))?;
        Ok(OperationPoll {
            state: OperationState::from(status.as_str()),
            error: self.error,
            retry_after,
        })
    }
}

/// Minimal view of any resource body, used to spot non-terminal writes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProvisioningView {
    #[serde(default)]
    pub properties: Option<ProvisioningProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProvisioningProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

impl ProvisioningView {
    pub fn state(&self) -> Option<OperationState> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
            .map(OperationState::from)
    }
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_async_operation_header_preferred() {
        let map = headers(&[
            ("Location", "https://management.azure.com/loc?api-version=1"),
            (
                "Azure-AsyncOperation",
                "https://management.azure.com/op?api-version=1",
            ),
            ("Retry-After", "17"),
        ]);

        let pending = PendingOperation::from_headers(&map).unwrap();
        assert_eq!(pending.kind, StatusKind::AsyncOperation);
        assert_eq!(pending.status_url.path(), "/op");
        assert_eq!(pending.retry_after, Some(Duration::from_secs(17)));
    }

    #[test]
    fn test_location_header_fallback() {
        let map = headers(&[("Location", "https://management.azure.com/loc")]);
        let pending = PendingOperation::from_headers(&map).unwrap();
        assert_eq!(pending.kind, StatusKind::Location);
        assert_eq!(pending.retry_after, None);
    }

    #[test]
    fn test_no_polling_headers() {
        assert!(PendingOperation::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_operation_state_parsing() {
        assert_eq!(OperationState::from("Succeeded"), OperationState::Succeeded);
        assert_eq!(OperationState::from("InProgress"), OperationState::InProgress);
        assert_eq!(OperationState::from("Canceled"), OperationState::Canceled);
        assert_eq!(OperationState::from("failed"), OperationState::Failed);
        assert_eq!(
            OperationState::from("ResolvingDNS"),
            OperationState::Other("ResolvingDNS".to_string())
        );
        assert!(!OperationState::from("Creating").is_terminal());
        assert!(OperationState::Failed.is_terminal());
    }

    #[test]
    fn test_async_body_requires_status() {
        let body: AsyncOperationBody = serde_json::from_str("{}").unwrap();
        assert!(body.into_poll(None).is_err());
    }
}
