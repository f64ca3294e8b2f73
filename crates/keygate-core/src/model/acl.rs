//! ACL shapes.
//!
//! A [`ServiceAcl`] is what provisioning stores per service: top-level rules plus
//! optional per-HTTP-method overrides. An [`AclObject`] is the effective, flat
//! policy for one request after method scoping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service name -> ACL.
pub type AclMap = BTreeMap<String, ServiceAcl>;

/// Group restriction carried by a service or an API entry.
///
/// A group list restricts callers to members of at least one group. A flag
/// only says whether an identity is required at all. Any other JSON value
/// behaves like a flag with its truthiness, so `"yes"` or `{}` demand an
/// identity while `0` or `""` do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessRule {
    Groups(Vec<String>),
    Flag(bool),
    Other(Value),
}

impl AccessRule {
    pub fn is_required(&self) -> bool {
        match self {
            AccessRule::Groups(_) => true,
            AccessRule::Flag(b) => *b,
            AccessRule::Other(v) => truthy(v),
        }
    }

    pub fn groups(&self) -> Option<&[String]> {
        match self {
            AccessRule::Groups(g) => Some(g),
            AccessRule::Flag(_) | AccessRule::Other(_) => None,
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Policy for paths not listed in `apis`/`apisRegExp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApisPermission {
    Restricted,
    #[default]
    #[serde(other)]
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessRule>,
}

impl ApiEntry {
    pub fn requires_access(&self) -> bool {
        self.access.as_ref().is_some_and(AccessRule::is_required)
    }
}

/// API entry matched by regular expression rather than exact path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexApiEntry {
    pub reg_exp: String,
    #[serde(flatten)]
    pub entry: ApiEntry,
}

/// Effective ACL for one service and HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AclObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apis: Option<BTreeMap<String, ApiEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apis_reg_exp: Option<Vec<RegexApiEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apis_permission: Option<ApisPermission>,
}

impl AclObject {
    /// True when the object declares an API set (exact or regex).
    pub fn defines_apis(&self) -> bool {
        self.apis.is_some() || self.apis_reg_exp.is_some()
    }

    pub fn is_restricted(&self) -> bool {
        self.apis_permission == Some(ApisPermission::Restricted)
    }
}

/// ACL for a service as stored by provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServiceAcl {
    #[serde(flatten)]
    pub base: AclObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<AclObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<AclObject>,
}

impl ServiceAcl {
    /// Method-level override for a lower-cased HTTP method name.
    pub fn method(&self, method: &str) -> Option<&AclObject> {
        match method {
            "get" => self.get.as_ref(),
            "post" => self.post.as_ref(),
            "put" => self.put.as_ref(),
            "patch" => self.patch.as_ref(),
            "delete" => self.delete.as_ref(),
            "head" => self.head.as_ref(),
            "options" => self.options.as_ref(),
            _ => None,
        }
    }

    /// Whether this ACL yields an API set for `method`, either at top level
    /// or through the method override.
    pub fn defines_apis_for(&self, method: &str) -> bool {
        self.base.defines_apis() || self.method(method).is_some_and(AclObject::defines_apis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn access_rule_accepts_list_or_flag() {
        let g: AccessRule = serde_json::from_str(r#"["admin","ops"]"#).unwrap();
        assert_eq!(g.groups(), Some(&["admin".to_string(), "ops".to_string()][..]));
        let f: AccessRule = serde_json::from_str("true").unwrap();
        assert!(f.is_required());
        let off: AccessRule = serde_json::from_str("false").unwrap();
        assert!(!off.is_required());
    }

    #[test]
    fn access_rule_other_values_use_truthiness() {
        for raw in [r#""admin""#, "1", "{}", r#"["admin",1]"#] {
            let rule: AccessRule = serde_json::from_str(raw).unwrap();
            assert!(matches!(rule, AccessRule::Other(_)), "{raw}");
            assert!(rule.is_required(), "{raw}");
            assert!(rule.groups().is_none(), "{raw}");
        }
        for raw in ["0", r#""""#] {
            let rule: AccessRule = serde_json::from_str(raw).unwrap();
            assert!(!rule.is_required(), "{raw}");
        }

        let entry: ApiEntry = serde_json::from_str(r#"{"access":"members"}"#).unwrap();
        assert!(entry.requires_access());
        let entry: ApiEntry = serde_json::from_str(r#"{"access":null}"#).unwrap();
        assert!(!entry.requires_access());
    }

    #[test]
    fn service_acl_splits_method_overrides() {
        let acl: ServiceAcl = serde_json::from_str(
            r#"{"access":["g1"],"get":{"apis":{"/x":{}},"apisPermission":"restricted"}}"#,
        )
        .unwrap();
        assert_eq!(acl.base.access, Some(AccessRule::Groups(vec!["g1".into()])));
        assert!(!acl.base.defines_apis());
        assert!(acl.defines_apis_for("get"));
        assert!(!acl.defines_apis_for("post"));
        assert!(acl.method("get").is_some_and(AclObject::is_restricted));
    }

    #[test]
    fn unknown_permission_is_open() {
        let acl: AclObject = serde_json::from_str(r#"{"apisPermission":"whatever"}"#).unwrap();
        assert_eq!(acl.apis_permission, Some(ApisPermission::Open));
    }
}
