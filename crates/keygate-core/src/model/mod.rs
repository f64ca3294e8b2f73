//! Provisioning and request-scoped data model.
//!
//! Field names follow the provisioning store's camelCase JSON so records can be
//! deserialized straight from it.

pub mod acl;
pub mod identity;
pub mod key;
pub mod rules;
pub mod session;

pub use acl::{AccessRule, AclMap, AclObject, ApiEntry, ApisPermission, RegexApiEntry, ServiceAcl};
pub use identity::{BearerToken, IdentitySnapshot, Profile, Roaming};
pub use key::{Application, KeyRecord, PackageRecord, TenantInfo, TenantRecord};
pub use rules::{DeviceRule, DeviceRules, GeoRules, OsRule, VersionRange, VersionRule};
pub use session::{GeoInfo, SessionDescriptor};
