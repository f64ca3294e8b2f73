//! Key, tenant, and package records supplied by provisioning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::acl::AclMap;
use super::rules::{DeviceRules, GeoRules};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default)]
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub app_id: String,
    /// Tenant-application ACL, keyed by service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<AclMap>,
}

/// Resolved external key. Read-only inside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// Internal key.
    pub key: String,
    pub ext_key: String,
    pub tenant: TenantInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    /// Tenant-level service configuration (defaults for every user).
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceRules>,
}

impl KeyRecord {
    /// Package id when the key links to an application with a package.
    pub fn package_id(&self) -> Option<&str> {
        self.application.as_ref()?.package.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<AclMap>,
    /// Environment -> service ACL map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_all_env: Option<BTreeMap<String, AclMap>>,
}

/// Tenant lookup result, used for roaming tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
}
