//! Pipeline steps, in execution order.

use std::fmt;

/// Static switches deciding which steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineFlags {
    pub security: bool,
    pub session: bool,
    pub multitenant: bool,
    pub acl: bool,
}

impl Default for PipelineFlags {
    fn default() -> Self {
        Self { security: true, session: true, multitenant: true, acl: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    GeoGuard,
    DeviceGuard,
    BuildSession,
    IdentityBridge,
    ServiceAclPresence,
    PermissionArbiter,
    PersistSession,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::GeoGuard => "geo_guard",
            Step::DeviceGuard => "device_guard",
            Step::BuildSession => "build_session",
            Step::IdentityBridge => "identity_bridge",
            Step::ServiceAclPresence => "service_acl_presence",
            Step::PermissionArbiter => "permission_arbiter",
            Step::PersistSession => "persist_session",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered step list for the given flags.
pub fn plan(flags: PipelineFlags) -> Vec<Step> {
    let mut steps = Vec::with_capacity(7);
    if flags.security {
        steps.extend([Step::GeoGuard, Step::DeviceGuard]);
    }
    if flags.session {
        steps.push(Step::BuildSession);
    }
    if flags.multitenant {
        steps.extend([Step::IdentityBridge, Step::ServiceAclPresence]);
    }
    if flags.multitenant && flags.acl {
        steps.push(Step::PermissionArbiter);
    }
    if flags.session {
        steps.push(Step::PersistSession);
    }
    steps
}
