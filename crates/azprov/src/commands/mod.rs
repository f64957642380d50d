pub mod progress;
pub mod provision;
pub mod resource_group;
pub mod storage_account;
pub mod subscription;

use azprov_core::{ArmClient, CoreError, ProvisionInputs};

use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;

/// Create a client and make sure it can get a token before any ARM call
pub(crate) async fn connect(conn_mgr: &ConnectionManager) -> CliResult<ArmClient> {
    let client = conn_mgr.create_arm_client()?;
    client.authenticate().await.map_err(CoreError::from)?;
    tracing::debug!("Authenticated with {}", client.credential_name());
    Ok(client)
}

/// Layer the config file under whatever flags and environment supplied
pub(crate) fn inputs(
    conn_mgr: &ConnectionManager,
    subscription: Option<&str>,
    resource_group: Option<&str>,
    storage_account: Option<&str>,
    region: Option<&str>,
) -> ProvisionInputs {
    ProvisionInputs {
        subscription_id: subscription.map(str::to_string),
        resource_group: resource_group.map(str::to_string),
        storage_account: storage_account.map(str::to_string),
        region: region.map(str::to_string),
    }
    .or_config(&conn_mgr.config)
}
