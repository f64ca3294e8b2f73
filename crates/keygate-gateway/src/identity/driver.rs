//! Identity driver collaborator and a fixture-backed implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use keygate_core::model::{AclMap, BearerToken, Profile, Roaming};
use keygate_core::{KeygateError, Result};

/// Per-request identity source. `init` must run before the getters.
#[async_trait]
pub trait IdentityDriver: Send {
    async fn init(&mut self) -> Result<Option<Profile>>;
    fn profile(&self) -> Option<Profile>;
    fn groups(&self) -> Option<Vec<String>>;
    fn acl(&self) -> Option<AclMap>;
    fn config(&self) -> Option<Value>;
}

/// Builds a driver for the request's bearer token and roaming target.
pub trait IdentityDriverFactory: Send + Sync {
    fn driver(&self, bearer: Option<&BearerToken>, roaming: Option<&Roaming>)
        -> Box<dyn IdentityDriver>;
}

/// Identity fixture, keyed by user id.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticIdentity {
    pub user_id: String,
    pub profile: Profile,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub acl: Option<AclMap>,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Default)]
pub struct StaticIdentityFactory {
    users: HashMap<String, Arc<StaticIdentity>>,
}

impl StaticIdentityFactory {
    pub fn new(identities: impl IntoIterator<Item = StaticIdentity>) -> Self {
        let users = identities
            .into_iter()
            .map(|i| (i.user_id.clone(), Arc::new(i)))
            .collect();
        Self { users }
    }
}

impl IdentityDriverFactory for StaticIdentityFactory {
    fn driver(
        &self,
        bearer: Option<&BearerToken>,
        _roaming: Option<&Roaming>,
    ) -> Box<dyn IdentityDriver> {
        let user_id = bearer.map(|b| b.user_id.clone());
        let identity = user_id.as_deref().and_then(|id| self.users.get(id)).cloned();
        Box::new(StaticIdentityDriver { user_id, identity, ready: false })
    }
}

pub struct StaticIdentityDriver {
    user_id: Option<String>,
    identity: Option<Arc<StaticIdentity>>,
    ready: bool,
}

impl StaticIdentityDriver {
    fn loaded(&self) -> Option<&StaticIdentity> {
        self.ready.then_some(self.identity.as_deref()).flatten()
    }
}

#[async_trait]
impl IdentityDriver for StaticIdentityDriver {
    async fn init(&mut self) -> Result<Option<Profile>> {
        match (&self.user_id, &self.identity) {
            (None, _) => Ok(None),
            (Some(_), Some(identity)) => {
                self.ready = true;
                Ok(Some(identity.profile.clone()))
            }
            (Some(id), None) => Err(KeygateError::Internal(format!("unknown user: {id}"))),
        }
    }

    fn profile(&self) -> Option<Profile> {
        self.loaded().map(|i| i.profile.clone())
    }

    fn groups(&self) -> Option<Vec<String>> {
        self.loaded().map(|i| i.groups.clone())
    }

    fn acl(&self) -> Option<AclMap> {
        self.loaded().and_then(|i| i.acl.clone())
    }

    fn config(&self) -> Option<Value> {
        self.loaded().and_then(|i| i.config.clone())
    }
}
