//! CLI structure and command definitions
//!
//! `provision` runs the whole sequence. The `resource-group` and
//! `storage-account` commands run a single step for scripting and recovery.

use clap::{Args, Parser, Subcommand};

pub mod resources;

pub use resources::*;

/// Provision an Azure resource group and storage account
#[derive(Parser, Debug)]
#[command(name = "azprov")]
#[command(
    version,
    about = "Provision an Azure resource group and a storage account inside it"
)]
#[command(long_about = "
Provision an Azure resource group and a storage account inside it

azprov makes sure the resource group exists (creating it if needed) and then
creates or updates a Standard_LRS, StorageV2, Hot-tier storage account in it.
Running it again with the same inputs is safe.

Credentials are picked up the same way the Azure SDKs do: service principal
environment variables, then managed identity, then your `az login` session.

EXAMPLES:
    # Provision with flags
    azprov provision --resource-group rg-demo --storage-account stdemo12345 --region eastus

    # Or with environment variables
    export AZPROV_RESOURCE_GROUP=rg-demo
    export AZPROV_STORAGE_ACCOUNT=stdemo12345
    export AZPROV_REGION=eastus
    azprov provision

    # Machine-readable result
    azprov provision -o json

    # Only make sure the resource group exists
    azprov resource-group ensure --resource-group rg-demo --region eastus

For more help on a specific command, run:
    azprov <command> --help
")]
pub struct Cli {
    /// Path to alternate configuration file
    #[arg(long, global = true, env = "AZPROV_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subscription to use instead of the default one
    #[arg(long, global = true, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Azure Resource Manager endpoint (sovereign clouds)
    #[arg(long, global = true, env = "AZPROV_ARM_ENDPOINT")]
    pub arm_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress and result lines
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ensure the resource group, then create or update the storage account
    #[command(after_help = "EXAMPLES:
    azprov provision --resource-group rg-demo --storage-account stdemo12345 --region eastus
    azprov provision -g rg-demo -n stdemo12345 -l westeurope -o json
")]
    Provision {
        #[command(flatten)]
        target: StorageTarget,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Resource group operations
    #[command(subcommand, name = "resource-group", visible_alias = "rg")]
    ResourceGroup(ResourceGroupCommands),

    /// Storage account operations
    #[command(subcommand, name = "storage-account", visible_alias = "sa")]
    StorageAccount(StorageAccountCommands),

    /// Subscription operations
    #[command(subcommand, visible_alias = "sub")]
    Subscription(SubscriptionCommands),

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    #[command(after_help = "EXAMPLES:
    # Bash
    azprov completions bash > ~/.local/share/bash-completion/completions/azprov

    # Zsh
    azprov completions zsh > \"${fpath[1]}/_azprov\"

    # Fish
    azprov completions fish > ~/.config/fish/completions/azprov.fish
")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    #[command(visible_alias = "ver")]
    Version,
}

/// Polling behaviour for long-running operations
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Give up waiting after this many seconds (default: wait until Azure finishes)
    #[arg(long)]
    pub wait_timeout: Option<u64>,

    /// Seconds between status polls when Azure does not suggest one
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}
