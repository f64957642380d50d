//! Arguments and subcommands for individual resources

use clap::{Args, Subcommand};

use super::WaitArgs;

/// Where a storage account should live
///
/// Every value may also come from the environment or the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct StorageTarget {
    /// Resource group name
    #[arg(long, short = 'g', env = "AZPROV_RESOURCE_GROUP")]
    pub resource_group: Option<String>,

    /// Storage account name (3-24 lowercase letters and digits, globally unique)
    #[arg(long, short = 'n', env = "AZPROV_STORAGE_ACCOUNT")]
    pub storage_account: Option<String>,

    /// Azure region, e.g. eastus
    #[arg(long, short = 'l', env = "AZPROV_REGION")]
    pub region: Option<String>,
}

/// A resource group and the region it should be created in
#[derive(Args, Debug, Clone, Default)]
pub struct GroupTarget {
    /// Resource group name
    #[arg(long, short = 'g', env = "AZPROV_RESOURCE_GROUP")]
    pub resource_group: Option<String>,

    /// Azure region used when the group has to be created
    #[arg(long, short = 'l', env = "AZPROV_REGION")]
    pub region: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ResourceGroupCommands {
    /// Create the resource group unless it already exists
    Ensure {
        #[command(flatten)]
        target: GroupTarget,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum StorageAccountCommands {
    /// Create or update the storage account in an existing resource group
    Create {
        #[command(flatten)]
        target: StorageTarget,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommands {
    /// Show the subscription azprov would provision into
    Show,
}
