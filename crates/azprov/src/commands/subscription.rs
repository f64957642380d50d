//! `azprov subscription show`

use azprov_core::resolve_subscription;

use super::{connect, inputs};
use crate::cli::{OutputFormat, SubscriptionCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::{self, print_output};

pub async fn handle_subscription_command(
    cmd: &SubscriptionCommands,
    conn_mgr: &ConnectionManager,
    subscription: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        SubscriptionCommands::Show => {
            let inputs = inputs(conn_mgr, subscription, None, None, None);
            let client = connect(conn_mgr).await?;
            let subscription = resolve_subscription(&client, inputs.subscription_id()).await?;

            match output::OutputFormat::structured(output_format) {
                Some(format) => print_output(&subscription, format)?,
                None => {
                    println!(
                        "Subscription: {} ({})",
                        subscription.display_name.as_deref().unwrap_or("-"),
                        subscription.subscription_id
                    );
                    println!(
                        "State:        {}",
                        subscription.state.as_deref().unwrap_or("unknown")
                    );
                    if let Some(tenant) = &subscription.tenant_id {
                        println!("Tenant:       {}", tenant);
                    }
                }
            }
            Ok(())
        }
    }
}
