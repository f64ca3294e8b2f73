//! AclResolver: picks the effective ACL for a service from the layered
//! sources and applies HTTP-method scoping.

use keygate_core::model::{AclMap, AclObject, ServiceAcl};

/// Resolve the effective ACL.
///
/// The identity layer wins when its entry for `service` declares an API set,
/// at top level or for `method`. Otherwise the tenant-application entry is
/// used if present, then the package entry. Returns `None` only when no
/// layer has an entry for the service.
pub fn resolve_acl(
    identity: Option<&AclMap>,
    tenant_application: Option<&AclMap>,
    package: Option<&AclMap>,
    service: &str,
    method: &str,
) -> Option<AclObject> {
    let method = method.to_lowercase();
    let from_identity = identity
        .and_then(|layer| layer.get(service))
        .filter(|acl| acl.defines_apis_for(&method));
    from_identity
        .or_else(|| tenant_application.and_then(|layer| layer.get(service)))
        .or_else(|| package.and_then(|layer| layer.get(service)))
        .map(|acl| scope_to_method(acl, &method))
}

/// Flatten a service ACL for one method. Top-level API sets take precedence
/// over method overrides.
fn scope_to_method(acl: &ServiceAcl, method: &str) -> AclObject {
    if acl.base.defines_apis() {
        return acl.base.clone();
    }
    match acl.method(method) {
        Some(scoped) => AclObject {
            access: scoped.access.clone().or_else(|| acl.base.access.clone()),
            apis: scoped.apis.clone(),
            apis_reg_exp: scoped.apis_reg_exp.clone(),
            apis_permission: scoped.apis_permission.or(acl.base.apis_permission),
        },
        None => acl.base.clone(),
    }
}
