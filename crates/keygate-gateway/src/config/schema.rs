use ipnetwork::IpNetwork;
use serde::Deserialize;

use keygate_core::model::{KeyRecord, PackageRecord, TenantRecord};
use keygate_core::{KeygateError, Result};

use crate::identity::{StaticIdentity, TokenGrant};
use crate::pipeline::PipelineFlags;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub service: ServiceSection,

    #[serde(default)]
    pub provisioning: ProvisioningSection,

    #[serde(default)]
    pub identities: Vec<StaticIdentity>,

    /// Bearer credentials accepted on `Authorization: Bearer`.
    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(KeygateError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.gateway.validate()?;
        self.service.validate()?;
        self.provisioning.validate()?;
        for (i, t) in self.tokens.iter().enumerate() {
            if t.token.trim().is_empty() {
                return Err(KeygateError::BadConfig(format!("tokens[{i}].token must not be empty")));
            }
            if self.tokens[..i].iter().any(|prev| prev.token == t.token) {
                return Err(KeygateError::BadConfig(format!("tokens[{i}] duplicates an earlier token")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Request header carrying the API key.
    #[serde(default = "default_key_header")]
    pub key_header: String,

    /// Salt handed to external key lookups.
    #[serde(default)]
    pub key_salt: String,

    /// Response header carrying the session id.
    #[serde(default = "default_session_header")]
    pub session_header: String,

    /// Peers (CIDR blocks) whose `x-forwarded-for` header is believed.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            key_header: default_key_header(),
            key_salt: String::new(),
            session_header: default_session_header(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.key_header.trim().is_empty() {
            return Err(KeygateError::BadConfig("gateway.key_header must not be empty".into()));
        }
        if self.session_header.trim().is_empty() {
            return Err(KeygateError::BadConfig(
                "gateway.session_header must not be empty".into(),
            ));
        }
        self.trusted_proxy_blocks()?;
        Ok(())
    }

    pub fn trusted_proxy_blocks(&self) -> Result<Vec<IpNetwork>> {
        self.trusted_proxies
            .iter()
            .map(|raw| {
                raw.trim().parse::<IpNetwork>().map_err(|e| {
                    KeygateError::BadConfig(format!("gateway.trusted_proxies: {raw}: {e}"))
                })
            })
            .collect()
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_key_header() -> String {
    "key".into()
}
fn default_session_header() -> String {
    "x-session-id".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    pub name: String,
    #[serde(default = "default_true")]
    pub ext_key_required: bool,
    #[serde(default = "default_true")]
    pub security: bool,
    #[serde(default = "default_true")]
    pub session: bool,
    #[serde(default = "default_true")]
    pub multitenant: bool,
    #[serde(default = "default_true")]
    pub acl: bool,
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KeygateError::BadConfig("service.name must not be empty".into()));
        }
        if self.acl && !self.multitenant {
            return Err(KeygateError::BadConfig(
                "service.acl requires service.multitenant".into(),
            ));
        }
        Ok(())
    }

    pub fn flags(&self) -> PipelineFlags {
        PipelineFlags {
            security: self.security,
            session: self.session,
            multitenant: self.multitenant,
            acl: self.acl,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Static provisioning snapshot served by the in-memory store.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProvisioningSection {
    #[serde(default)]
    pub keys: Vec<KeyRecord>,
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub tenants: Vec<TenantRecord>,
}

impl ProvisioningSection {
    pub fn validate(&self) -> Result<()> {
        if self.packages.is_empty() {
            return Ok(());
        }
        for k in &self.keys {
            if let Some(pkg) = k.package_id() {
                if !self.packages.iter().any(|p| p.code == pkg) {
                    return Err(KeygateError::BadConfig(format!(
                        "key {} references undeclared package {pkg}",
                        k.ext_key
                    )));
                }
            }
        }
        Ok(())
    }
}
