use anyhow::Result;
use azprov_core::Config;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::AzprovError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<(), AzprovError> {
    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };

    let conn_mgr = ConnectionManager::with_config_path(config, config_path)
        .with_arm_endpoint(cli.arm_endpoint.clone());
    debug!(
        "Using ARM endpoint {} (config path: {:?})",
        conn_mgr.endpoint(),
        conn_mgr.config_path
    );

    execute_command(cli, &conn_mgr).await
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "azprov=warn,azprov_core=warn",
            1 => "azprov=info,azprov_core=info",
            2 => "azprov=debug,azprov_core=debug",
            _ => "azprov=trace,azprov_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    // stdout carries command output; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), AzprovError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let subscription = cli.subscription.as_deref();
    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match output::OutputFormat::structured(cli.output) {
                Some(fmt) => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    output::print_output(&output_data, fmt)?;
                }
                None => {
                    println!("azprov {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }

        Commands::Provision { target, wait } => {
            commands::provision::handle_provision(conn_mgr, subscription, target, wait, cli.output)
                .await
        }

        Commands::ResourceGroup(cmd) => {
            commands::resource_group::handle_resource_group_command(
                cmd,
                conn_mgr,
                subscription,
                cli.output,
            )
            .await
        }

        Commands::StorageAccount(cmd) => {
            commands::storage_account::handle_storage_account_command(
                cmd,
                conn_mgr,
                subscription,
                cli.output,
            )
            .await
        }

        Commands::Subscription(cmd) => {
            commands::subscription::handle_subscription_command(
                cmd,
                conn_mgr,
                subscription,
                cli.output,
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Provision { target, .. } => format!(
            "provision {} / {} in {}",
            target.resource_group.as_deref().unwrap_or("<config>"),
            target.storage_account.as_deref().unwrap_or("<config>"),
            target.region.as_deref().unwrap_or("<config>"),
        ),
        Commands::ResourceGroup(cmd) => {
            use cli::ResourceGroupCommands::*;
            match cmd {
                Ensure { target, .. } => format!(
                    "resource-group ensure {}",
                    target.resource_group.as_deref().unwrap_or("<config>")
                ),
            }
        }
        Commands::StorageAccount(cmd) => {
            use cli::StorageAccountCommands::*;
            match cmd {
                Create { target, .. } => format!(
                    "storage-account create {}",
                    target.storage_account.as_deref().unwrap_or("<config>")
                ),
            }
        }
        Commands::Subscription(cmd) => {
            use cli::SubscriptionCommands::*;
            match cmd {
                Show => "subscription show".to_string(),
            }
        }
    }
}
