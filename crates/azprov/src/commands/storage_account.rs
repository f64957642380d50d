//! `azprov storage-account create`

use azprov_core::{create_storage_account, resolve_subscription};

use super::{connect, inputs, progress};
use crate::cli::{OutputFormat, StorageAccountCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{self, print_output};

pub async fn handle_storage_account_command(
    cmd: &StorageAccountCommands,
    conn_mgr: &ConnectionManager,
    subscription: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        StorageAccountCommands::Create { target, wait } => {
            let inputs = inputs(
                conn_mgr,
                subscription,
                target.resource_group.as_deref(),
                target.storage_account.as_deref(),
                target.region.as_deref(),
            );
            let resource_group = inputs.resource_group()?;
            let name = inputs.storage_account()?;
            let region = inputs.region()?;

            let client = connect(conn_mgr).await?;
            let subscription = resolve_subscription(&client, inputs.subscription_id()).await?;
            let options = conn_mgr
                .wait_options(wait)
                .with_progress(progress::reporter(output_format));

            // The group is not created here; a missing one surfaces as ResourceGroupNotFound
            let account = create_storage_account(
                &client,
                &subscription.subscription_id,
                resource_group,
                name,
                region,
                &options,
            )
            .await?;

            match output::OutputFormat::structured(output_format) {
                Some(format) => print_output(&account, format)?,
                None => {
                    println!(
                        "Storage Account '{}' created in resource group '{}'!",
                        account.name, resource_group
                    );
                    println!("Storage account created successfully!");
                }
            }
            Ok(())
        }
    }
}
