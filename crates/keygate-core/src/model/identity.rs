//! Caller identity as supplied by the identity driver.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::acl::AclMap;

/// Delegated bearer token descriptor, resolved from `Authorization: Bearer`
/// or attached by an outer authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerToken {
    pub env: String,
    pub client_id: String,
    pub user_id: String,
}

impl BearerToken {
    /// Dashboard-issued tokens act on behalf of another tenant.
    pub fn is_roaming(&self) -> bool {
        self.env == "dashboard"
    }
}

/// Tenant a roaming token acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roaming {
    pub tenant_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity facts gathered for one request. Empty when the caller is anonymous
/// or the identity driver failed to initialize.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentitySnapshot {
    pub profile: Option<Profile>,
    pub groups: Option<Vec<String>>,
    pub acl: Option<AclMap>,
}

impl IdentitySnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    /// True when the caller belongs to at least one of `allowed`.
    pub fn in_any_group(&self, allowed: &[String]) -> bool {
        self.groups
            .as_deref()
            .is_some_and(|groups| groups.iter().any(|g| allowed.contains(g)))
    }
}
