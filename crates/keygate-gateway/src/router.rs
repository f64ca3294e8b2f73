//! Axum router wiring.
//!
//! Every path except `/healthz` goes through the authorization middleware
//! before reaching the handler.
//!
//! Callers are identified by `Authorization: Bearer <token>`, resolved
//! against the configured `tokens`. A host that validates credentials in an
//! outer layer may insert a `keygate_core::model::BearerToken` extension
//! instead; the middleware uses it as-is. The server must be started with
//! `into_make_service_with_connect_info::<SocketAddr>()` so the peer address
//! is available for geo rules and trusted-proxy checks.

use axum::{
    extract::Extension,
    http::{Method, StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::{app_state::AppState, transport::http::{authorize, Authorized}};

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Stand-in upstream: reports what the gateway authorized.
pub async fn accepted(method: Method, uri: Uri, auth: Option<Extension<Authorized>>) -> impl IntoResponse {
    let body = match auth {
        Some(Extension(a)) => json!({
            "method": method.as_str(),
            "path": uri.path(),
            "tenant": a.tenant_id,
            "session": a.session_id,
            "user": a.identity.profile.map(|p| p.id),
            "config": a.services_config,
        }),
        None => json!({ "method": method.as_str(), "path": uri.path() }),
    };
    Json(body)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(accepted)
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .route("/healthz", get(healthz))
        .with_state(state)
}
