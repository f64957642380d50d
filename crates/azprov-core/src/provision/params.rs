//! Inputs for the provisioning workflow
//!
//! Values can come from several layers (flags, environment, config file).
//! [`ProvisionInputs`] collects whatever each layer supplied and
//! [`ProvisionInputs::into_request`] turns the result into a validated
//! [`ProvisionRequest`].

use crate::config::Config;
use crate::error::{CoreError, Result};

/// A complete, validated set of provisioning inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Explicit subscription; the default subscription is used when `None`
    pub subscription_id: Option<String>,
    pub resource_group: String,
    pub storage_account: String,
    pub region: String,
}

impl ProvisionRequest {
    /// Create a request against the default subscription
    #[must_use]
    pub fn new(
        resource_group: impl Into<String>,
        storage_account: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: None,
            resource_group: resource_group.into(),
            storage_account: storage_account.into(),
            region: region.into(),
        }
    }

    /// Pin the subscription
    #[must_use]
    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Reject blank values before anything is sent to Azure
    pub fn validate(&self) -> Result<()> {
        for (value, input) in [
            (&self.resource_group, Input::ResourceGroup),
            (&self.storage_account, Input::StorageAccount),
            (&self.region, Input::Region),
        ] {
            if value.trim().is_empty() {
                return Err(input.missing());
            }
        }
        if self
            .subscription_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(CoreError::Validation(
                "subscription id must not be empty when given".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partially supplied inputs from one configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionInputs {
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub storage_account: Option<String>,
    pub region: Option<String>,
}

impl ProvisionInputs {
    /// Fill gaps from the config file; values already present win
    #[must_use]
    pub fn or_config(self, config: &Config) -> Self {
        Self {
            subscription_id: self.subscription_id.or_else(|| config.subscription_id.clone()),
            resource_group: self.resource_group.or_else(|| config.resource_group.clone()),
            storage_account: self.storage_account.or_else(|| config.storage_account.clone()),
            region: self.region.or_else(|| config.region.clone()),
        }
    }

    /// Require the three mandatory inputs and validate the result
    pub fn into_request(self) -> Result<ProvisionRequest> {
        let request = ProvisionRequest {
            subscription_id: self.subscription_id().map(str::to_string),
            resource_group: self.resource_group()?.to_string(),
            storage_account: self.storage_account()?.to_string(),
            region: self.region()?.to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    /// The pinned subscription, ignoring blank values
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    pub fn resource_group(&self) -> Result<&str> {
        require(self.resource_group.as_deref(), Input::ResourceGroup)
    }

    pub fn storage_account(&self) -> Result<&str> {
        require(self.storage_account.as_deref(), Input::StorageAccount)
    }

    pub fn region(&self) -> Result<&str> {
        require(self.region.as_deref(), Input::Region)
    }
}

fn require(value: Option<&str>, input: Input) -> Result<&str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| input.missing())
}

#[derive(Debug, Clone, Copy)]
enum Input {
    ResourceGroup,
    StorageAccount,
    Region,
}

impl Input {
    fn missing(self) -> CoreError {
        let (what, flag, env) = match self {
            Input::ResourceGroup => ("resource group name", "--resource-group", "AZPROV_RESOURCE_GROUP"),
            Input::StorageAccount => (
                "storage account name",
                "--storage-account",
                "AZPROV_STORAGE_ACCOUNT",
            ),
            Input::Region => ("region", "--region", "AZPROV_REGION"),
        };
        CoreError::Validation(format!(
            "missing {}: pass {} or set {}",
            what, flag, env
        ))
    }
}

/// Describe why Azure will reject a storage account name, if it obviously will
///
/// Azure owns the authoritative check (including global uniqueness); this
/// only catches the shape rules: 3-24 characters, lowercase letters and digits.
#[must_use]
pub fn storage_account_name_issue(name: &str) -> Option<String> {
    let len = name.chars().count();
    if !(3..=24).contains(&len) {
        return Some(format!(
            "'{}' is {} characters long; storage account names must be 3-24",
            name, len
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
    {
        return Some(format!(
            "'{}' contains '{}'; only lowercase letters and digits are allowed",
            name, bad
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_win_over_config() {
        let config = Config {
            resource_group: Some("rg-config".to_string()),
            storage_account: Some("stconfig".to_string()),
            region: Some("westeurope".to_string()),
            subscription_id: Some("sub-config".to_string()),
            ..Default::default()
        };

        let inputs = ProvisionInputs {
            resource_group: Some("rg-flag".to_string()),
            ..Default::default()
        };

        let request = inputs.or_config(&config).into_request().unwrap();
        assert_eq!(request.resource_group, "rg-flag");
        assert_eq!(request.storage_account, "stconfig");
        assert_eq!(request.region, "westeurope");
        assert_eq!(request.subscription_id.as_deref(), Some("sub-config"));
    }

    #[test]
    fn test_missing_input_names_flag_and_env() {
        let inputs = ProvisionInputs {
            resource_group: Some("rg-demo".to_string()),
            storage_account: Some("stdemo12345".to_string()),
            ..Default::default()
        };

        let err = inputs.into_request().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing region"));
        assert!(msg.contains("--region"));
        assert!(msg.contains("AZPROV_REGION"));
    }

    #[test]
    fn test_blank_values_rejected() {
        let err = ProvisionRequest::new("  ", "stdemo12345", "eastus")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("resource group name"));

        let err = ProvisionRequest::new("rg", "stdemo12345", "eastus")
            .with_subscription("")
            .validate()
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_blank_subscription_falls_back_to_default() {
        let inputs = ProvisionInputs {
            subscription_id: Some(String::new()),
            resource_group: Some("rg-demo".to_string()),
            storage_account: Some("stdemo12345".to_string()),
            region: Some("eastus".to_string()),
        };
        let request = inputs.into_request().unwrap();
        assert_eq!(request.subscription_id, None);
    }

    #[test]
    fn test_single_input_accessors() {
        let inputs = ProvisionInputs {
            resource_group: Some("rg-demo".to_string()),
            region: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(inputs.resource_group().unwrap(), "rg-demo");
        assert!(inputs.region().unwrap_err().to_string().contains("--region"));
        assert!(
            inputs
                .storage_account()
                .unwrap_err()
                .to_string()
                .contains("AZPROV_STORAGE_ACCOUNT")
        );
    }

    #[test]
    fn test_storage_account_name_issue() {
        assert_eq!(storage_account_name_issue("stdemo12345"), None);
        assert!(storage_account_name_issue("st").unwrap().contains("3-24"));
        assert!(
            storage_account_name_issue("a-very-long-storage-account-name")
                .unwrap()
                .contains("3-24")
        );
        assert!(
            storage_account_name_issue("StDemo")
                .unwrap()
                .contains("'S'")
        );
        assert!(storage_account_name_issue("st_demo").is_some());
    }
}
