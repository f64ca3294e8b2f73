//! Geo and device admission rule sets attached to a key.

use serde::{Deserialize, Serialize};

/// CIDR allow/deny lists. Bare addresses are treated as host routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeoRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeviceRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<DeviceRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<DeviceRule>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// Constraint on one version component (`major`, `minor`, `patch`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionRule {
    /// Exact value, or `"*"` for any.
    Exact(String),
    Range(VersionRange),
}

/// OS constraint: `"*"`, a bare family substring, or a full descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OsRule {
    Family(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        family: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        major: Option<VersionRule>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minor: Option<VersionRule>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        patch: Option<VersionRule>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeviceRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<VersionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<VersionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<VersionRule>,
}
