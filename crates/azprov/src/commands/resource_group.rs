//! `azprov resource-group ensure`

use azprov_core::{ensure_resource_group, resolve_subscription};

use super::{connect, inputs, progress};
use crate::cli::{OutputFormat, ResourceGroupCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{self, print_output};

pub async fn handle_resource_group_command(
    cmd: &ResourceGroupCommands,
    conn_mgr: &ConnectionManager,
    subscription: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ResourceGroupCommands::Ensure { target, wait } => {
            let inputs = inputs(
                conn_mgr,
                subscription,
                target.resource_group.as_deref(),
                None,
                target.region.as_deref(),
            );
            let name = inputs.resource_group()?;
            let region = inputs.region()?;

            let client = connect(conn_mgr).await?;
            let subscription = resolve_subscription(&client, inputs.subscription_id()).await?;
            let options = conn_mgr
                .wait_options(wait)
                .with_progress(progress::reporter(output_format));

            let ensured = ensure_resource_group(
                &client,
                &subscription.subscription_id,
                name,
                region,
                &options,
            )
            .await?;

            match output::OutputFormat::structured(output_format) {
                Some(format) => print_output(&ensured, format)?,
                None => println!(
                    "Resource Group {} is ready in {}.",
                    ensured.resource_group.name, ensured.resource_group.location
                ),
            }
            Ok(())
        }
    }
}
