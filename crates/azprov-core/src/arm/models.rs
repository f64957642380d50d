//! Wire models for the Resource Manager endpoints used by azprov
//!
//! Only the fields azprov reads or writes are modelled. Everything is
//! `camelCase` on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page of results from a list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

// =============================================================================
// Subscriptions
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Fully qualified id, `/subscriptions/{subscriptionId}`
    #[serde(default)]
    pub id: String,
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// `Enabled`, `Disabled`, `Warned`, `PastDue`, `Deleted`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl Subscription {
    /// Whether resources can be created in this subscription
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state
            .as_deref()
            .is_none_or(|state| state.eq_ignore_ascii_case("Enabled"))
    }
}

// =============================================================================
// Resource groups
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    /// `/subscriptions/{sub}/resourceGroups/{name}`
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub properties: ResourceGroupProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

impl ResourceGroup {
    /// Subscription id parsed from the resource id
    #[must_use]
    pub fn subscription_id(&self) -> Option<&str> {
        let mut segments = self.id.split('/').filter(|s| !s.is_empty());
        while let Some(segment) = segments.next() {
            if segment.eq_ignore_ascii_case("subscriptions") {
                return segments.next();
            }
        }
        None
    }
}

/// Body of `PUT .../resourcegroups/{name}`
#[derive(Debug, Clone, Serialize)]
pub struct ResourceGroupCreateParameters {
    pub location: String,
}

// =============================================================================
// Storage accounts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkuName {
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "Standard_GRS")]
    StandardGrs,
    #[serde(rename = "Standard_RAGRS")]
    StandardRagrs,
    #[serde(rename = "Standard_ZRS")]
    StandardZrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    StorageV2,
    Storage,
    BlobStorage,
    BlockBlobStorage,
    FileStorage,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTier {
    Hot,
    Cool,
    Cold,
    Premium,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for SkuName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkuName::StandardLrs => write!(f, "Standard_LRS"),
            SkuName::StandardGrs => write!(f, "Standard_GRS"),
            SkuName::StandardRagrs => write!(f, "Standard_RAGRS"),
            SkuName::StandardZrs => write!(f, "Standard_ZRS"),
            SkuName::PremiumLrs => write!(f, "Premium_LRS"),
            SkuName::Other(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::StorageV2 => write!(f, "StorageV2"),
            StorageKind::Storage => write!(f, "Storage"),
            StorageKind::BlobStorage => write!(f, "BlobStorage"),
            StorageKind::BlockBlobStorage => write!(f, "BlockBlobStorage"),
            StorageKind::FileStorage => write!(f, "FileStorage"),
            StorageKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessTier::Hot => write!(f, "Hot"),
            AccessTier::Cool => write!(f, "Cool"),
            AccessTier::Cold => write!(f, "Cold"),
            AccessTier::Premium => write!(f, "Premium"),
            AccessTier::Other(tier) => write!(f, "{}", tier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSku {
    pub name: SkuName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl StorageSku {
    pub fn new(name: SkuName) -> Self {
        Self { name, tier: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub sku: Option<StorageSku>,
    #[serde(default)]
    pub kind: Option<StorageKind>,
    #[serde(default)]
    pub properties: StorageAccountProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub access_tier: Option<AccessTier>,
    #[serde(default)]
    pub primary_endpoints: Option<Endpoints>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    #[serde(default)]
    pub blob: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub dfs: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
}

/// Body of `PUT .../storageAccounts/{name}`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountCreateParameters {
    pub sku: StorageSku,
    pub kind: StorageKind,
    pub location: String,
    pub properties: StorageAccountCreateProperties,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountCreateProperties {
    pub access_tier: AccessTier,
}

impl StorageAccountCreateParameters {
    /// The one configuration azprov provisions: standard locally-redundant
    /// replication, general-purpose v2, hot tier
    pub fn standard_v2_hot(location: impl Into<String>) -> Self {
        Self {
            sku: StorageSku::new(SkuName::StandardLrs),
            kind: StorageKind::StorageV2,
            location: location.into(),
            properties: StorageAccountCreateProperties {
                access_tier: AccessTier::Hot,
            },
        }
    }
}
