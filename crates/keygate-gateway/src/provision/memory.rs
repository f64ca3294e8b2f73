use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use keygate_core::model::{KeyRecord, PackageRecord, SessionDescriptor, TenantRecord};
use keygate_core::Result;

use super::{AuthorizationSetter, Provisioning, SessionStore};

/// Provisioning snapshot held in memory.
///
/// Keys are indexed by their external key; the salt only matters to stores
/// that keep keys encrypted, so it is ignored here.
#[derive(Default)]
pub struct MemoryProvisioning {
    keys: DashMap<String, Arc<KeyRecord>>,
    packages: DashMap<String, Arc<PackageRecord>>,
    tenants: DashMap<String, TenantRecord>,
}

impl MemoryProvisioning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_key(&self, record: KeyRecord) {
        self.keys.insert(record.ext_key.clone(), Arc::new(record));
    }

    pub fn insert_package(&self, record: PackageRecord) {
        self.packages.insert(record.code.clone(), Arc::new(record));
    }

    pub fn insert_tenant(&self, record: TenantRecord) {
        self.tenants.insert(record.id.clone(), record);
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait]
impl Provisioning for MemoryProvisioning {
    async fn external_key_data(&self, key: &str, _salt: &str) -> Result<Option<Arc<KeyRecord>>> {
        Ok(self.keys.get(key).map(|r| Arc::clone(r.value())))
    }

    async fn package_data(&self, package_id: &str) -> Result<Option<Arc<PackageRecord>>> {
        Ok(self.packages.get(package_id).map(|r| Arc::clone(r.value())))
    }

    async fn tenant_data(&self, tenant_id: &str) -> Result<Option<TenantRecord>> {
        Ok(self.tenants.get(tenant_id).map(|r| r.value().clone()))
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionDescriptor>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<SessionDescriptor> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, session_id: &str, session: &SessionDescriptor) -> Result<()> {
        self.sessions.insert(session_id.to_string(), session.clone());
        Ok(())
    }
}

/// Echoes the session id back in a response header.
pub struct SessionHeader {
    name: String,
}

impl SessionHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AuthorizationSetter for SessionHeader {
    fn set(&self, session_id: &str) -> Option<(String, String)> {
        Some((self.name.clone(), session_id.to_string()))
    }
}
