//! Resource Manager REST client

use chrono::Duration as ChronoDuration;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use super::error::ArmError;
use super::models::{
    Page, ResourceGroup, ResourceGroupCreateParameters, StorageAccount,
    StorageAccountCreateParameters, Subscription,
};
use super::operation::{
    AsyncOperationBody, OperationPoll, OperationStart, OperationState, PendingOperation,
    ProvisioningView, StatusKind, retry_after,
};
use crate::credential::{AccessToken, CredentialError, TokenCredential};

/// Public Azure cloud Resource Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

pub const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
pub const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";
pub const STORAGE_API_VERSION: &str = "2023-01-01";

/// User agent string for azprov HTTP requests
const AZPROV_USER_AGENT: &str = concat!("azprov/", env!("CARGO_PKG_VERSION"));

/// Refresh cached tokens this long before they expire
const TOKEN_REFRESH_MARGIN_MINUTES: i64 = 5;

/// Authenticated client for the handful of ARM operations azprov needs
#[derive(Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: Url,
    scope: String,
    credential: Arc<dyn TokenCredential>,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credential", &self.credential.name())
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    /// Create a client for `endpoint`, e.g. [`DEFAULT_ENDPOINT`]
    ///
    /// Tokens are requested for the `{endpoint}/.default` scope.
    pub fn new(credential: Arc<dyn TokenCredential>, endpoint: &str) -> Result<Self, ArmError> {
        let trimmed = endpoint.trim_end_matches('/');
        let endpoint = Url::parse(trimmed)?;
        if endpoint.cannot_be_a_base() {
            return Err(ArmError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let http = reqwest::Client::builder()
            .user_agent(AZPROV_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            scope: format!("{}/.default", trimmed),
            endpoint,
            credential,
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// The Resource Manager base URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Name of the credential this client authenticates with
    pub fn credential_name(&self) -> &'static str {
        self.credential.name()
    }

    /// Acquire (and cache) a token up front so credential problems surface
    /// before any resource call
    pub async fn authenticate(&self) -> Result<(), CredentialError> {
        self.bearer().await.map(|_| ())
    }

    async fn bearer(&self) -> Result<String, CredentialError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && !token.expires_within(ChronoDuration::minutes(TOKEN_REFRESH_MARGIN_MINUTES))
        {
            return Ok(token.token.clone());
        }

        debug!("Requesting access token from {}", self.credential.name());
        let token = self.credential.get_token(&[self.scope.as_str()]).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn resource_url(&self, segments: &[&str], api_version: &str) -> Result<Url, ArmError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ArmError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, ArmError> {
        let token = self.bearer().await?;
        debug!(%method, %url, "ARM request");

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        trace!(status = %response.status(), "ARM response");
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ArmError> {
        let response = self.send::<()>(Method::GET, url, None).await?;
        let response = check(response).await?;
        decode(response).await
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// List every subscription visible to the credential, following `nextLink`
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ArmError> {
        let mut url = self.resource_url(&["subscriptions"], SUBSCRIPTIONS_API_VERSION)?;
        let mut subscriptions = Vec::new();
        loop {
            let page: Page<Subscription> = self.get_json(url.clone()).await?;
            subscriptions.extend(page.value);
            match page.next_link {
                // A link back to the same page would never terminate
                Some(next) if next != url.as_str() => url = Url::parse(&next)?,
                _ => break,
            }
        }
        Ok(subscriptions)
    }

    /// Fetch one subscription by id
    pub async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, ArmError> {
        let url = self.resource_url(
            &["subscriptions", subscription_id],
            SUBSCRIPTIONS_API_VERSION,
        )?;
        self.get_json(url).await
    }

    // =========================================================================
    // Resource groups
    // =========================================================================

    fn resource_group_url(&self, subscription_id: &str, name: &str) -> Result<Url, ArmError> {
        self.resource_url(
            &["subscriptions", subscription_id, "resourcegroups", name],
            RESOURCE_GROUPS_API_VERSION,
        )
    }

    /// `HEAD` the resource group: 204 means it exists, 404 that it does not
    pub async fn resource_group_exists(
        &self,
        subscription_id: &str,
        name: &str,
    ) -> Result<bool, ArmError> {
        let url = self.resource_group_url(subscription_id, name)?;
        let response = self.send::<()>(Method::HEAD, url, None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => check(response).await.map(|_| true),
        }
    }

    pub async fn get_resource_group(
        &self,
        subscription_id: &str,
        name: &str,
    ) -> Result<ResourceGroup, ArmError> {
        let url = self.resource_group_url(subscription_id, name)?;
        self.get_json(url).await
    }

    pub async fn create_or_update_resource_group(
        &self,
        subscription_id: &str,
        name: &str,
        params: &ResourceGroupCreateParameters,
    ) -> Result<OperationStart<ResourceGroup>, ArmError> {
        let url = self.resource_group_url(subscription_id, name)?;
        let response = self.send(Method::PUT, url, Some(params)).await?;
        start_operation(response).await
    }

    // =========================================================================
    // Storage accounts
    // =========================================================================

    fn storage_account_url(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<Url, ArmError> {
        self.resource_url(
            &[
                "subscriptions",
                subscription_id,
                "resourceGroups",
                resource_group,
                "providers",
                "Microsoft.Storage",
                "storageAccounts",
                name,
            ],
            STORAGE_API_VERSION,
        )
    }

    /// Issue the storage account upsert; the storage provider usually answers
    /// 202 and finishes in the background
    pub async fn begin_create_storage_account(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
        params: &StorageAccountCreateParameters,
    ) -> Result<OperationStart<StorageAccount>, ArmError> {
        let url = self.storage_account_url(subscription_id, resource_group, name)?;
        let response = self.send(Method::PUT, url, Some(params)).await?;
        start_operation(response).await
    }

    pub async fn get_storage_account(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<StorageAccount, ArmError> {
        let url = self.storage_account_url(subscription_id, resource_group, name)?;
        self.get_json(url).await
    }

    // =========================================================================
    // Long-running operations
    // =========================================================================

    /// Observe a pending operation once
    pub async fn operation_status(
        &self,
        operation: &PendingOperation,
    ) -> Result<OperationPoll, ArmError> {
        let response = self
            .send::<()>(Method::GET, operation.status_url.clone(), None)
            .await?;
        let response = check(response).await?;
        let retry_after = retry_after(response.headers());

        match operation.kind {
            StatusKind::AsyncOperation => {
                let body: AsyncOperationBody = decode(response).await?;
                body.into_poll(retry_after)
            }
            StatusKind::Location => {
                let state = if response.status() == StatusCode::ACCEPTED {
                    OperationState::InProgress
                } else {
                    OperationState::Succeeded
                };
                Ok(OperationPoll {
                    state,
                    error: None,
                    retry_after,
                })
            }
        }
    }
}

/// Turn non-success responses into [`ArmError::Api`]
async fn check(response: Response) -> Result<Response, ArmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %body, "ARM error response");
    Err(ArmError::from_response(status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ArmError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ArmError::Decode(e.to_string()))
}

async fn start_operation<T: DeserializeOwned>(
    response: Response,
) -> Result<OperationStart<T>, ArmError> {
    let response = check(response).await?;
    let status = response.status();
    let pending = PendingOperation::from_headers(response.headers());
    let body = response.text().await?;

    if status == StatusCode::ACCEPTED {
        return pending.map(OperationStart::Pending).ok_or_else(|| {
            ArmError::Decode("202 Accepted without a polling header".to_string())
        });
    }

    // 201 + Azure-AsyncOperation: the body is a snapshot, not the final state
    if let Some(pending) = pending.filter(|p| p.kind == StatusKind::AsyncOperation) {
        let view: ProvisioningView = serde_json::from_str(&body).unwrap_or_default();
        if !view.state().is_some_and(|state| state.is_terminal()) {
            return Ok(OperationStart::Pending(pending));
        }
    }

    serde_json::from_str(&body)
        .map(OperationStart::Done)
        .map_err(|e| ArmError::Decode(e.to_string()))
}
