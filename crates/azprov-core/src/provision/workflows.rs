//! Provisioning workflows - multi-step operations
//!
//! These compose the single-request [`ArmClient`] operations with
//! long-running operation polling and progress reporting. Each step is
//! usable on its own; [`provision`] runs them in order.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::params::{ProvisionRequest, storage_account_name_issue};
use crate::arm::{
    ArmClient, ArmError, OperationStart, ResourceGroup, ResourceGroupCreateParameters,
    StorageAccount, StorageAccountCreateParameters, Subscription,
};
use crate::error::{CoreError, Result};
use crate::progress::{ProgressEvent, Target, WaitOptions, poll_operation};

/// Result of [`ensure_resource_group`]
#[derive(Debug, Clone, Serialize)]
pub struct EnsuredResourceGroup {
    pub resource_group: ResourceGroup,
    /// `false` when the group already existed and was left untouched
    pub created: bool,
}

/// Everything a successful [`provision`] run touched
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionOutcome {
    pub subscription: Subscription,
    pub resource_group: ResourceGroup,
    pub resource_group_created: bool,
    pub storage_account: StorageAccount,
}

/// Pick the subscription to provision into
///
/// An explicit id is fetched directly. Otherwise the first enabled
/// subscription visible to the credential is used, the same one
/// `az account show` would normally report.
pub async fn resolve_subscription(
    client: &ArmClient,
    subscription_id: Option<&str>,
) -> Result<Subscription> {
    let subscription = match subscription_id {
        Some(id) => client
            .get_subscription(id)
            .await
            .map_err(subscription_error)?,
        None => {
            let subscriptions = client
                .list_subscriptions()
                .await
                .map_err(subscription_error)?;
            debug!(count = subscriptions.len(), "Listed subscriptions");
            subscriptions
                .into_iter()
                .find(Subscription::is_enabled)
                .ok_or(CoreError::NoSubscription)?
        }
    };

    info!(
        subscription_id = %subscription.subscription_id,
        display_name = subscription.display_name.as_deref().unwrap_or(""),
        "Using subscription"
    );
    Ok(subscription)
}

fn subscription_error(source: ArmError) -> CoreError {
    match source {
        ArmError::Credential(e) => CoreError::Authentication(e),
        other => CoreError::Subscription(other),
    }
}

/// Make sure a resource group exists, creating it when it does not
///
/// An existing group is never modified, even when it lives in a different
/// region than requested; a warning is logged instead.
pub async fn ensure_resource_group(
    client: &ArmClient,
    subscription_id: &str,
    name: &str,
    region: &str,
    options: &WaitOptions,
) -> Result<EnsuredResourceGroup> {
    let target = Target::ResourceGroup(name.to_string());

    let exists = client
        .resource_group_exists(subscription_id, name)
        .await
        .map_err(|e| target.error(e))?;

    if exists {
        info!("Resource Group {} already exists.", name);
        options.emit(ProgressEvent::ResourceGroupExists {
            name: name.to_string(),
        });

        let resource_group = client
            .get_resource_group(subscription_id, name)
            .await
            .map_err(|e| target.error(e))?;

        if !same_region(&resource_group.location, region) {
            warn!(
                resource_group = %name,
                existing = %resource_group.location,
                requested = %region,
                "Resource group already exists in a different region; leaving it unchanged"
            );
        }

        return Ok(EnsuredResourceGroup {
            resource_group,
            created: false,
        });
    }

    info!("Creating Resource Group: {} in {}...", name, region);
    options.emit(ProgressEvent::ResourceGroupCreating {
        name: name.to_string(),
        region: region.to_string(),
    });

    let params = ResourceGroupCreateParameters {
        location: region.to_string(),
    };
    let start = client
        .create_or_update_resource_group(subscription_id, name, &params)
        .await
        .map_err(|e| target.error(e))?;

    let resource_group = match start {
        OperationStart::Done(group) => group,
        OperationStart::Pending(operation) => {
            poll_operation(client, &target, &operation, options).await?;
            client
                .get_resource_group(subscription_id, name)
                .await
                .map_err(|e| target.error(e))?
        }
    };

    Ok(EnsuredResourceGroup {
        resource_group,
        created: true,
    })
}

/// Create or update a storage account and wait until it is provisioned
///
/// The account is always Standard_LRS, StorageV2, Hot tier. Re-running with
/// the same name against the same group is an idempotent upsert; a name
/// owned by someone else comes back as a 409 `StorageAccountAlreadyTaken`.
pub async fn create_storage_account(
    client: &ArmClient,
    subscription_id: &str,
    resource_group: &str,
    name: &str,
    region: &str,
    options: &WaitOptions,
) -> Result<StorageAccount> {
    let target = Target::StorageAccount(name.to_string());

    if let Some(issue) = storage_account_name_issue(name) {
        warn!("{}; Azure will likely reject it", issue);
    }

    options.emit(ProgressEvent::StorageAccountUpserting {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
    });

    let params = StorageAccountCreateParameters::standard_v2_hot(region);
    let start = client
        .begin_create_storage_account(subscription_id, resource_group, name, &params)
        .await
        .map_err(|e| target.error(e))?;

    let account = match start {
        OperationStart::Done(account) => account,
        OperationStart::Pending(operation) => {
            poll_operation(client, &target, &operation, options).await?;
            client
                .get_storage_account(subscription_id, resource_group, name)
                .await
                .map_err(|e| target.error(e))?
        }
    };

    info!(
        "Storage Account '{}' created in resource group '{}'!",
        account.name, resource_group
    );
    Ok(account)
}

/// Run the whole provisioning sequence
///
/// 1. Authenticate
/// 2. Resolve the subscription
/// 3. Ensure the resource group
/// 4. Create or update the storage account
///
/// A failure at any step stops the sequence; later steps are never
/// attempted.
///
/// # Example
///
/// ```rust,ignore
/// use azprov_core::{ProvisionRequest, WaitOptions, provision};
///
/// let request = ProvisionRequest::new("rg-demo", "stdemo12345", "eastus");
/// let outcome = provision(&client, &request, &WaitOptions::default()).await?;
/// println!("{}", outcome.storage_account.id);
/// ```
pub async fn provision(
    client: &ArmClient,
    request: &ProvisionRequest,
    options: &WaitOptions,
) -> Result<ProvisionOutcome> {
    request.validate()?;

    client.authenticate().await?;
    debug!(credential = client.credential_name(), "Authenticated");

    let subscription = resolve_subscription(client, request.subscription_id.as_deref()).await?;
    options.emit(ProgressEvent::SubscriptionResolved {
        subscription_id: subscription.subscription_id.clone(),
        display_name: subscription.display_name.clone(),
    });

    let ensured = ensure_resource_group(
        client,
        &subscription.subscription_id,
        &request.resource_group,
        &request.region,
        options,
    )
    .await?;

    let storage_account = create_storage_account(
        client,
        &subscription.subscription_id,
        &ensured.resource_group.name,
        &request.storage_account,
        &request.region,
        options,
    )
    .await?;

    Ok(ProvisionOutcome {
        subscription,
        resource_group: ensured.resource_group,
        resource_group_created: ensured.created,
        storage_account,
    })
}

/// ARM reports display names ("East US") in some places and codes ("eastus")
/// in others
fn same_region(a: &str, b: &str) -> bool {
    let normalize = |s: &str| {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    normalize(a) == normalize(b)
}
