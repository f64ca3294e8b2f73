//! Bearer credential resolution.
//!
//! The middleware turns an `Authorization: Bearer <token>` header into a
//! [`BearerToken`] through a [`BearerResolver`]. An upstream layer that has
//! already validated the credential can instead insert a `BearerToken`
//! request extension, which always takes precedence over the header.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use keygate_core::model::BearerToken;
use keygate_core::Result;

/// Maps an opaque bearer credential to the token claims the pipeline uses.
#[async_trait]
pub trait BearerResolver: Send + Sync {
    /// `Ok(None)` for an unknown credential; the caller stays anonymous.
    async fn resolve(&self, credential: &str) -> Result<Option<BearerToken>>;
}

/// A statically issued credential, as declared in config.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenGrant {
    pub token: String,
    pub env: String,
    pub client_id: String,
    pub user_id: String,
}

impl From<&TokenGrant> for BearerToken {
    fn from(g: &TokenGrant) -> Self {
        BearerToken { env: g.env.clone(), client_id: g.client_id.clone(), user_id: g.user_id.clone() }
    }
}

#[derive(Default)]
pub struct MemoryBearerTokens {
    tokens: DashMap<String, BearerToken>,
}

impl MemoryBearerTokens {
    pub fn new<I: IntoIterator<Item = TokenGrant>>(grants: I) -> Self {
        let tokens = DashMap::new();
        for g in grants {
            tokens.insert(g.token.clone(), BearerToken::from(&g));
        }
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl BearerResolver for MemoryBearerTokens {
    async fn resolve(&self, credential: &str) -> Result<Option<BearerToken>> {
        Ok(self.tokens.get(credential).map(|t| t.value().clone()))
    }
}

/// Credential part of an `Authorization` header value using the bearer scheme.
pub fn bearer_credential(header: &str) -> Option<&str> {
    let (scheme, credential) = header.trim().split_once(' ')?;
    let credential = credential.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !credential.is_empty()).then_some(credential)
}
