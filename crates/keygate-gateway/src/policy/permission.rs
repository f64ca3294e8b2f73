//! PermissionArbiter: pass/fail for the matched API under the effective ACL.
//!
//! Order of evaluation:
//! 1. Service-level `access` with an identity: groups must intersect.
//! 2. Service-level `access` without one: only an unguarded matched API may pass.
//! 3. Matched entry (or restricted policy): entry-level access decides.
//! 4. Otherwise allow.

use keygate_core::model::{AccessRule, AclObject, ApiEntry, IdentitySnapshot};
use keygate_core::KeygateError;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::RuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    GroupMismatchServiceLevel,
    GroupMismatchApiLevel,
    AnonymousDeniedServiceLevel,
    AnonymousDeniedApiLevel,
    RestrictedNoMatchingApi,
}

impl From<DenyReason> for KeygateError {
    fn from(r: DenyReason) -> Self {
        match r {
            DenyReason::GroupMismatchServiceLevel => KeygateError::GroupMismatchServiceLevel,
            DenyReason::GroupMismatchApiLevel => KeygateError::GroupMismatchApiLevel,
            DenyReason::AnonymousDeniedServiceLevel => KeygateError::AnonymousDeniedServiceLevel,
            DenyReason::AnonymousDeniedApiLevel => KeygateError::AnonymousDeniedApiLevel,
            DenyReason::RestrictedNoMatchingApi => KeygateError::RestrictedNoMatchingApi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

/// Compiled `apisRegExp` patterns keyed by source text. Invalid patterns are
/// cached as `None` so they are reported once.
static COMPILED: Lazy<DashMap<String, Option<Regex>>> = Lazy::new(DashMap::new);

fn compiled(pattern: &str) -> Option<Regex> {
    if let Some(hit) = COMPILED.get(pattern) {
        return hit.clone();
    }
    let re = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            let err = RuleError::Regex { rule: pattern.to_owned(), reason: e.to_string() };
            tracing::error!(error = %err, "acl regexp skipped");
            None
        }
    };
    COMPILED.insert(pattern.to_owned(), re.clone());
    re
}

/// Exact path match first, then the first `apisRegExp` entry (in list order)
/// whose expression matches. Invalid expressions are logged and skipped.
pub fn match_api<'a>(acl: &'a AclObject, path: &str) -> Option<&'a ApiEntry> {
    if let Some(entry) = acl.apis.as_ref().and_then(|apis| apis.get(path)) {
        return Some(entry);
    }
    acl.apis_reg_exp.as_deref()?.iter().find_map(|candidate| {
        compiled(&candidate.reg_exp)
            .filter(|re| re.is_match(path))
            .map(|_| &candidate.entry)
    })
}

/// Decide whether the caller may invoke `api` under `acl`.
pub fn decide(acl: &AclObject, api: Option<&ApiEntry>, caller: &IdentitySnapshot) -> Decision {
    if let Some(access) = acl.access.as_ref().filter(|a| a.is_required()) {
        if caller.is_authenticated() {
            if let Some(groups) = access.groups() {
                if !caller.in_any_group(groups) {
                    return Decision::Denied(DenyReason::GroupMismatchServiceLevel);
                }
            }
        } else if api.map_or(true, ApiEntry::requires_access) {
            return Decision::Denied(DenyReason::AnonymousDeniedServiceLevel);
        }
        return check_permission(acl, api, caller);
    }
    if api.is_some() || acl.is_restricted() {
        return check_permission(acl, api, caller);
    }
    Decision::Allowed
}

fn check_permission(acl: &AclObject, api: Option<&ApiEntry>, caller: &IdentitySnapshot) -> Decision {
    match api {
        None if acl.is_restricted() => Decision::Denied(DenyReason::RestrictedNoMatchingApi),
        None => Decision::Allowed,
        Some(entry) => check_access(entry.access.as_ref(), caller),
    }
}

/// Entry-level access: a group list needs a member, a `true` flag needs any
/// identity.
fn check_access(access: Option<&AccessRule>, caller: &IdentitySnapshot) -> Decision {
    let Some(access) = access.filter(|a| a.is_required()) else {
        return Decision::Allowed;
    };
    if !caller.is_authenticated() {
        return Decision::Denied(DenyReason::AnonymousDeniedApiLevel);
    }
    match access.groups() {
        Some(groups) if !caller.in_any_group(groups) => {
            Decision::Denied(DenyReason::GroupMismatchApiLevel)
        }
        _ => Decision::Allowed,
    }
}
