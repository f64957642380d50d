//! Error types for azprov
//!
//! Core errors are flattened into [`AzprovError`], which knows how to
//! suggest a fix for the common failures and print itself cargo-style.

use azprov_core::CoreError;
use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: storage account 'stdemo12345' failed: HTTP 409 StorageAccountAlreadyTaken: ...
///
///   tip: storage account names are global across Azure; choose another name
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the azprov application
#[derive(Error, Debug)]
pub enum AzprovError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Subscription error: {message}")]
    Subscription { message: String },

    #[error("Resource group '{name}' failed: {message}")]
    ResourceGroup {
        name: String,
        code: Option<String>,
        status: Option<u16>,
        message: String,
    },

    #[error("Storage account '{name}' failed: {message}")]
    StorageAccount {
        name: String,
        code: Option<String>,
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    OperationFailed { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for azprov operations
pub type Result<T> = std::result::Result<T, AzprovError>;

impl AzprovError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            AzprovError::AuthenticationFailed { .. } => vec![
                "Sign in with the Azure CLI: az login".to_string(),
                "Or set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET for a service principal".to_string(),
                "Run with -vv to see which credential sources were tried".to_string(),
            ],
            AzprovError::Subscription { .. } => vec![
                "List the subscriptions you can use: az account list -o table".to_string(),
                "Pick one explicitly: --subscription <id> or AZURE_SUBSCRIPTION_ID".to_string(),
            ],
            AzprovError::InvalidInput { .. } => vec![
                "Check the command syntax: azprov <command> --help".to_string(),
            ],
            AzprovError::StorageAccount { code: Some(code), .. }
                if code == "StorageAccountAlreadyTaken" =>
            {
                vec![
                    "Storage account names are global across Azure; choose another name".to_string(),
                ]
            }
            AzprovError::StorageAccount { code: Some(code), .. }
                if code == "AccountNameInvalid" =>
            {
                vec!["Use 3-24 lowercase letters and digits for the storage account name".to_string()]
            }
            AzprovError::ResourceGroup { status: Some(403), .. }
            | AzprovError::StorageAccount { status: Some(403), .. } => vec![
                "The signed-in identity needs Contributor (or equivalent) on the subscription".to_string(),
                "Check role assignments: az role assignment list --assignee <principal>".to_string(),
            ],
            AzprovError::ResourceGroup { code: Some(code), .. }
            | AzprovError::StorageAccount { code: Some(code), .. }
                if code == "LocationNotAvailableForResourceGroup"
                    || code == "LocationNotAvailableForResourceType"
                    || code == "NoRegisteredProviderFound" =>
            {
                vec!["List valid region names: az account list-locations -o table".to_string()]
            }
            AzprovError::Timeout { .. } => vec![
                "The operation may still complete in Azure; re-running azprov is safe".to_string(),
                "Raise or drop --wait-timeout to wait longer".to_string(),
            ],
            AzprovError::Configuration(_) => vec![
                "Check the config file syntax, or point --config-file somewhere else".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let AzprovError::ResourceGroup { code: Some(code), .. }
        | AzprovError::StorageAccount { code: Some(code), .. } = self
        {
            diag = diag.detail(&format!("Azure error code: {}", code));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CoreError> for AzprovError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication(e) => AzprovError::AuthenticationFailed {
                message: e.to_string(),
            },
            CoreError::Subscription(e) => AzprovError::Subscription {
                message: e.to_string(),
            },
            CoreError::NoSubscription => AzprovError::Subscription {
                message: CoreError::NoSubscription.to_string(),
            },
            CoreError::ResourceGroup { name, source } => AzprovError::ResourceGroup {
                name,
                code: source.code().map(str::to_string),
                status: source.status(),
                message: source.to_string(),
            },
            CoreError::StorageAccount { name, source } => AzprovError::StorageAccount {
                name,
                code: source.code().map(str::to_string),
                status: source.status(),
                message: source.to_string(),
            },
            err @ CoreError::OperationFailed { .. } => AzprovError::OperationFailed {
                message: err.to_string(),
            },
            CoreError::OperationTimeout(duration) => AzprovError::Timeout {
                message: format!(
                    "Operation did not finish within {} seconds",
                    duration.as_secs()
                ),
            },
            CoreError::Validation(message) => AzprovError::InvalidInput { message },
            CoreError::Config(e) => AzprovError::Configuration(e.to_string()),
        }
    }
}

impl From<azprov_core::config::ConfigError> for AzprovError {
    fn from(err: azprov_core::config::ConfigError) -> Self {
        AzprovError::Configuration(err.to_string())
    }
}

impl From<azprov_core::ArmError> for AzprovError {
    fn from(err: azprov_core::ArmError) -> Self {
        use azprov_core::ArmError;
        match err {
            ArmError::Url(_) => AzprovError::Configuration(err.to_string()),
            ArmError::Credential(e) => AzprovError::AuthenticationFailed {
                message: e.to_string(),
            },
            err @ (ArmError::Api { .. } | ArmError::Request(_) | ArmError::Decode(_)) => {
                AzprovError::OperationFailed {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<serde_json::Error> for AzprovError {
    fn from(err: serde_json::Error) -> Self {
        AzprovError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<anyhow::Error> for AzprovError {
    fn from(err: anyhow::Error) -> Self {
        AzprovError::OutputError {
            message: err.to_string(),
        }
    }
}
