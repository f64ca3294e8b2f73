//! Admission and authorization policy.
//!
//! Geo and device guards filter callers by network and client; the ACL
//! resolver and permission arbiter decide whether the caller may invoke the
//! matched API. Everything here is a pure function of its inputs.

pub mod acl;
pub mod device;
pub mod geo;
pub mod permission;
pub mod useragent;

use thiserror::Error;

pub use acl::resolve_acl;
pub use device::check_device;
pub use geo::check_geo;
pub use permission::{decide, match_api, Decision, DenyReason};

/// Outcome of an admission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
}

/// Malformed rule entry. Logged and skipped, never fatal.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid cidr {rule:?}: {reason}")]
    Cidr { rule: String, reason: String },
    #[error("invalid api regexp {rule:?}: {reason}")]
    Regex { rule: String, reason: String },
}
