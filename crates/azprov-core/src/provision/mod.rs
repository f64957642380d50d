//! Resource group and storage account provisioning

mod params;
mod workflows;

pub use params::{ProvisionInputs, ProvisionRequest, storage_account_name_issue};
pub use workflows::{
    EnsuredResourceGroup, ProvisionOutcome, create_storage_account, ensure_resource_group,
    provision, resolve_subscription,
};
