//! IdentityBridge: roaming resolution, identity driver invocation, and the
//! tenant/user service configuration merge.

pub mod bearer;
pub mod driver;
pub mod merge;

use serde_json::Value;

use keygate_core::model::{BearerToken, IdentitySnapshot, Roaming};
use keygate_core::{KeygateError, Result};

use crate::provision::Provisioning;

pub use bearer::{bearer_credential, BearerResolver, MemoryBearerTokens, TokenGrant};
pub use driver::{IdentityDriver, IdentityDriverFactory, StaticIdentity, StaticIdentityFactory};
pub use merge::deep_merge;

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityOutcome {
    pub roaming: Option<Roaming>,
    pub identity: IdentitySnapshot,
    pub services_config: Value,
}

/// Resolve the tenant a roaming token acts for. Lookup failures abort.
async fn resolve_roaming(provisioning: &dyn Provisioning, token: &BearerToken) -> Result<Roaming> {
    let tenant = provisioning
        .tenant_data(&token.client_id)
        .await?
        .ok_or_else(|| {
            KeygateError::Provisioning(format!("unknown roaming tenant: {}", token.client_id))
        })?;
    Ok(Roaming {
        tenant_id: token.client_id.clone(),
        user_id: token.user_id.clone(),
        code: Some(tenant.code),
    })
}

/// Gather caller identity and compute the effective service configuration.
///
/// A failing identity driver is logged and leaves the caller anonymous.
pub async fn resolve_identity(
    provisioning: &dyn Provisioning,
    factory: &dyn IdentityDriverFactory,
    bearer: Option<&BearerToken>,
    tenant_config: &Value,
) -> Result<IdentityOutcome> {
    let roaming = match bearer.filter(|b| b.is_roaming()) {
        Some(token) => Some(resolve_roaming(provisioning, token).await?),
        None => None,
    };

    let mut driver = factory.driver(bearer, roaming.as_ref());
    let (identity, user_config) = match driver.init().await {
        Ok(profile) => {
            let identity = IdentitySnapshot {
                profile: profile.or_else(|| driver.profile()),
                groups: driver.groups(),
                acl: driver.acl(),
            };
            (identity, driver.config())
        }
        Err(e) => {
            tracing::error!(error = %e, "identity driver init failed");
            (IdentitySnapshot::default(), None)
        }
    };

    let services_config = match user_config {
        Some(user) => deep_merge(tenant_config, &user),
        None => tenant_config.clone(),
    };
    Ok(IdentityOutcome { roaming, identity, services_config })
}
