//! `azprov provision`

use azprov_core::provision;
use tracing::info;

use super::{connect, inputs, progress};
use crate::cli::{OutputFormat, StorageTarget, WaitArgs};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{self, print_output};

pub async fn handle_provision(
    conn_mgr: &ConnectionManager,
    subscription: Option<&str>,
    target: &StorageTarget,
    wait: &WaitArgs,
    output_format: OutputFormat,
) -> CliResult<()> {
    let request = inputs(
        conn_mgr,
        subscription,
        target.resource_group.as_deref(),
        target.storage_account.as_deref(),
        target.region.as_deref(),
    )
    .into_request()?;
    info!(
        resource_group = %request.resource_group,
        storage_account = %request.storage_account,
        region = %request.region,
        "Provisioning"
    );

    let client = connect(conn_mgr).await?;
    let options = conn_mgr
        .wait_options(wait)
        .with_progress(progress::reporter(output_format));

    let outcome = provision(&client, &request, &options).await?;

    match output::OutputFormat::structured(output_format) {
        Some(format) => print_output(&outcome, format)?,
        None => {
            println!(
                "Storage Account '{}' created in resource group '{}'!",
                outcome.storage_account.name, outcome.resource_group.name
            );
            println!("Storage account created successfully!");
        }
    }
    Ok(())
}
