//! Authorization pipeline driver.
//!
//! Key resolution runs first, then the planned steps in order over one
//! `RequestContext`. The first failing step aborts the rest and its error is
//! returned unchanged.

pub mod step;

use std::sync::Arc;

use keygate_core::model::GeoInfo;
use keygate_core::{KeygateError, Result};

use crate::context::{build_session, RequestContext, RequestInput};
use crate::identity::{resolve_identity, IdentityDriverFactory};
use crate::policy::{self, Decision, Verdict};
use crate::provision::{AuthorizationSetter, Provisioning, SessionStore};

pub use step::{plan, PipelineFlags, Step};

/// External services the pipeline calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub provisioning: Arc<dyn Provisioning>,
    pub identity: Arc<dyn IdentityDriverFactory>,
    pub sessions: Arc<dyn SessionStore>,
    pub authorization: Arc<dyn AuthorizationSetter>,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Service name used for ACL lookup.
    pub service: String,
    pub key_salt: String,
    /// When false the service is public and no checks run.
    pub ext_key_required: bool,
    pub flags: PipelineFlags,
}

#[derive(Debug)]
pub enum Outcome {
    /// Service does not require a key.
    Bypassed,
    Proceed(Box<RequestContext>),
}

pub struct Pipeline {
    settings: PipelineSettings,
    steps: Vec<Step>,
    collab: Collaborators,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings, collab: Collaborators) -> Self {
        let steps = plan(settings.flags);
        Self { settings, steps, collab }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the pipeline for one request.
    pub async fn authorize(&self, input: RequestInput) -> Result<Outcome> {
        if !self.settings.ext_key_required {
            return Ok(Outcome::Bypassed);
        }
        let mut ctx = self.load_context(input).await?;

        for &step in &self.steps {
            if let Err(e) = self.run_step(step, &mut ctx).await {
                tracing::debug!(
                    %step,
                    tenant = %ctx.tenant_id(),
                    service = %ctx.service,
                    api = %ctx.api_path(),
                    code = e.code().numeric(),
                    "request rejected"
                );
                return Err(e);
            }
        }
        Ok(Outcome::Proceed(Box::new(ctx)))
    }

    /// Resolve key and package records.
    async fn load_context(&self, input: RequestInput) -> Result<RequestContext> {
        let prov = &self.collab.provisioning;

        let raw_key = input
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(KeygateError::MissingOrInvalidKey)?;
        let key = prov
            .external_key_data(raw_key, &self.settings.key_salt)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "key lookup failed");
                None
            })
            .filter(|k| k.package_id().is_some())
            .ok_or(KeygateError::MissingOrInvalidKey)?;

        let package_id = key.package_id().unwrap_or_default().to_string();
        let package = prov
            .package_data(&package_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, package = %package_id, "package lookup failed");
                None
            })
            .ok_or(KeygateError::MissingPackage(package_id))?;

        Ok(RequestContext::new(input, self.settings.service.clone(), key, package))
    }

    async fn run_step(&self, step: Step, ctx: &mut RequestContext) -> Result<()> {
        match step {
            Step::GeoGuard => {
                let ip = ctx.input.client_ip;
                ctx.geo = ip.map(|ip| GeoInfo { ip });
                match policy::check_geo(ip, ctx.key.geo.as_ref()) {
                    Verdict::Allowed => Ok(()),
                    Verdict::Denied => Err(KeygateError::GeoDenied),
                }
            }
            Step::DeviceGuard => {
                ctx.device = ctx.input.user_agent.clone();
                match policy::check_device(ctx.device.as_deref(), ctx.key.device.as_ref()) {
                    Verdict::Allowed => Ok(()),
                    Verdict::Denied => Err(KeygateError::DeviceDenied),
                }
            }
            Step::BuildSession => {
                ctx.session = Some(build_session(
                    &ctx.key,
                    ctx.device.as_deref(),
                    ctx.geo.as_ref(),
                    &ctx.service,
                    ctx.api_path(),
                ));
                Ok(())
            }
            Step::IdentityBridge => {
                let out = resolve_identity(
                    self.collab.provisioning.as_ref(),
                    self.collab.identity.as_ref(),
                    ctx.input.bearer.as_ref(),
                    &ctx.key.config,
                )
                .await?;
                ctx.roaming = out.roaming;
                ctx.identity = out.identity;
                ctx.services_config = Some(out.services_config);
                Ok(())
            }
            Step::ServiceAclPresence => {
                let application_acl = ctx.key.application.as_ref().and_then(|a| a.acl.as_ref());
                let acl = policy::resolve_acl(
                    ctx.identity.acl.as_ref(),
                    application_acl,
                    ctx.package.acl.as_ref(),
                    &ctx.service,
                    &ctx.input.method,
                )
                .ok_or_else(|| KeygateError::NoAclForService(ctx.service.clone()))?;
                ctx.acl = Some(acl);
                Ok(())
            }
            Step::PermissionArbiter => {
                let acl = ctx
                    .acl
                    .as_ref()
                    .ok_or_else(|| KeygateError::NoAclForService(ctx.service.clone()))?;
                let api = policy::match_api(acl, ctx.api_path());
                match policy::decide(acl, api, &ctx.identity) {
                    Decision::Allowed => Ok(()),
                    Decision::Denied(reason) => Err(reason.into()),
                }
            }
            Step::PersistSession => {
                let session = ctx
                    .session
                    .as_ref()
                    .ok_or_else(|| KeygateError::Internal("session not built".into()))?;
                let session_id = ctx
                    .input
                    .session_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

                if let Err(e) = self.collab.sessions.set(&session_id, session).await {
                    tracing::error!(error = %e, session = %session_id, "session persist failed");
                    return Err(KeygateError::SessionPersistenceFailure(e.to_string()));
                }
                if let Some(header) = self.collab.authorization.set(&session_id) {
                    ctx.response_headers.push(header);
                }
                ctx.input.session_id = Some(session_id);
                Ok(())
            }
        }
    }
}
