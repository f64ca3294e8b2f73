//! Per-request context threaded through the pipeline.
//!
//! `RequestInput` is what the host extracts from the HTTP request;
//! `RequestContext` accumulates findings (device, geo, session, identity, ACL)
//! as steps run. One context per request, written only by the running step.

pub mod session;

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;

use keygate_core::model::{
    AclObject, BearerToken, GeoInfo, IdentitySnapshot, KeyRecord, PackageRecord, Roaming,
    SessionDescriptor,
};

pub use session::build_session;

/// Request facts supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    pub key: Option<String>,
    pub method: String,
    /// Matched route path used for ACL lookup.
    pub route_path: String,
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub bearer: Option<BearerToken>,
    pub session_id: Option<String>,
}

/// Working set for one request.
#[derive(Debug)]
pub struct RequestContext {
    pub input: RequestInput,
    pub service: String,
    pub key: Arc<KeyRecord>,
    pub package: Arc<PackageRecord>,

    pub geo: Option<GeoInfo>,
    pub device: Option<String>,
    pub session: Option<SessionDescriptor>,

    pub roaming: Option<Roaming>,
    pub identity: IdentitySnapshot,
    /// Tenant service config deep-merged with the caller's own.
    pub services_config: Option<Value>,
    pub acl: Option<AclObject>,

    /// Response headers requested by the authorization setter.
    pub response_headers: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(
        input: RequestInput,
        service: String,
        key: Arc<KeyRecord>,
        package: Arc<PackageRecord>,
    ) -> Self {
        Self {
            input,
            service,
            key,
            package,
            geo: None,
            device: None,
            session: None,
            roaming: None,
            identity: IdentitySnapshot::default(),
            services_config: None,
            acl: None,
            response_headers: Vec::new(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.key.tenant.id
    }

    pub fn api_path(&self) -> &str {
        &self.input.route_path
    }
}
