//! Shared application state for the keygate gateway.
//!
//! Builds the pipeline once at startup from config, wiring either the
//! in-memory collaborators or caller-supplied ones.

use std::sync::Arc;

use ipnetwork::IpNetwork;
use keygate_core::Result;

use crate::config::GatewayConfig;
use crate::identity::{BearerResolver, MemoryBearerTokens, StaticIdentityFactory};
use crate::pipeline::{Collaborators, Pipeline, PipelineSettings};
use crate::provision::{MemoryProvisioning, MemorySessionStore, SessionHeader};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    pipeline: Pipeline,
    bearer: Arc<dyn BearerResolver>,
    trusted_proxies: Vec<IpNetwork>,
}

impl AppState {
    /// Build state backed by the config's provisioning snapshot.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let provisioning = MemoryProvisioning::new();
        for k in &cfg.provisioning.keys {
            provisioning.insert_key(k.clone());
        }
        for p in &cfg.provisioning.packages {
            provisioning.insert_package(p.clone());
        }
        for t in &cfg.provisioning.tenants {
            provisioning.insert_tenant(t.clone());
        }

        // snapshot <-> service sanity check
        let service = cfg.service.name.as_str();
        if cfg.service.ext_key_required && provisioning.key_count() == 0 {
            tracing::warn!(%service, "service requires a key but no keys are provisioned");
        }
        for p in &cfg.provisioning.packages {
            if !p.acl.as_ref().is_some_and(|acl| acl.contains_key(service)) {
                tracing::warn!(%service, package = %p.code, "package has no acl for this service");
            }
        }

        let collab = Collaborators {
            provisioning: Arc::new(provisioning),
            identity: Arc::new(StaticIdentityFactory::new(cfg.identities.iter().cloned())),
            sessions: Arc::new(MemorySessionStore::new()),
            authorization: Arc::new(SessionHeader::new(cfg.gateway.session_header.clone())),
        };
        Self::with_collaborators(cfg, collab)
    }

    /// Build state with externally provided collaborators. Bearer
    /// credentials are served from the config's `tokens`.
    pub fn with_collaborators(cfg: GatewayConfig, collab: Collaborators) -> Result<Self> {
        let tokens = MemoryBearerTokens::new(cfg.tokens.iter().cloned());
        Self::with_bearer_resolver(cfg, collab, Arc::new(tokens))
    }

    pub fn with_bearer_resolver(
        cfg: GatewayConfig,
        collab: Collaborators,
        bearer: Arc<dyn BearerResolver>,
    ) -> Result<Self> {
        let trusted_proxies = cfg.gateway.trusted_proxy_blocks()?;
        let settings = PipelineSettings {
            service: cfg.service.name.clone(),
            key_salt: cfg.gateway.key_salt.clone(),
            ext_key_required: cfg.service.ext_key_required,
            flags: cfg.service.flags(),
        };
        let pipeline = Pipeline::new(settings, collab);
        tracing::info!(steps = ?pipeline.steps(), "authorization pipeline planned");
        Ok(Self { inner: Arc::new(AppStateInner { cfg, pipeline, bearer, trusted_proxies }) })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    pub fn bearer(&self) -> &dyn BearerResolver {
        self.inner.bearer.as_ref()
    }

    pub fn trusted_proxies(&self) -> &[IpNetwork] {
        &self.inner.trusted_proxies
    }
}
