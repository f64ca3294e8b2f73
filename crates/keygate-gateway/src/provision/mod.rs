//! Provisioning and session-store collaborators.
//!
//! The pipeline only sees these traits; `memory` holds snapshot-backed
//! implementations used by the binary and tests.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use keygate_core::model::{KeyRecord, PackageRecord, SessionDescriptor, TenantRecord};
use keygate_core::Result;

pub use memory::{MemoryProvisioning, MemorySessionStore, SessionHeader};

/// Read-only access to key/package/tenant records.
#[async_trait]
pub trait Provisioning: Send + Sync {
    async fn external_key_data(&self, key: &str, salt: &str) -> Result<Option<Arc<KeyRecord>>>;
    async fn package_data(&self, package_id: &str) -> Result<Option<Arc<PackageRecord>>>;
    async fn tenant_data(&self, tenant_id: &str) -> Result<Option<TenantRecord>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, session_id: &str, session: &SessionDescriptor) -> Result<()>;
}

/// Response authorization marker, applied after the session is persisted.
pub trait AuthorizationSetter: Send + Sync {
    /// Header to attach to the response, if any.
    fn set(&self, session_id: &str) -> Option<(String, String)>;
}
