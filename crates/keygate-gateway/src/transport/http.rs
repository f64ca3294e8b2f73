//! Axum middleware running the authorization pipeline in front of handlers.
//!
//! - The caller's bearer token comes from a `BearerToken` request extension
//!   if an outer layer inserted one, else from `Authorization: Bearer` via
//!   the state's resolver. Unknown credentials leave the caller anonymous.
//! - `x-forwarded-for` is only believed when the TCP peer is a configured
//!   trusted proxy.
//! - Allowed requests continue with an [`Authorized`] extension.
//! - Denials become a bare status with code headers; no body is written.
//! - Internal faults (including panics inside the pipeline) are logged and
//!   answered with a generic JSON error.

use std::any::Any;
use std::net::{IpAddr, SocketAddr};
use std::panic::AssertUnwindSafe;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use ipnetwork::IpNetwork;
use serde_json::{json, Value};

use keygate_core::model::{BearerToken, IdentitySnapshot, Roaming, SessionDescriptor};
use keygate_core::{ErrorCode, KeygateError};

use crate::app_state::AppState;
use crate::context::{RequestContext, RequestInput};
use crate::identity::bearer_credential;
use crate::pipeline::Outcome;

pub const CODE_HEADER: &str = "x-keygate-code";
pub const ERROR_HEADER: &str = "x-keygate-error";

/// Request extension for handlers behind the gateway.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub tenant_id: String,
    pub session_id: Option<String>,
    pub session: Option<SessionDescriptor>,
    pub identity: IdentitySnapshot,
    pub roaming: Option<Roaming>,
    pub services_config: Option<Value>,
}

impl From<RequestContext> for Authorized {
    fn from(ctx: RequestContext) -> Self {
        Self {
            tenant_id: ctx.key.tenant.id.clone(),
            session_id: ctx.input.session_id,
            session: ctx.session,
            identity: ctx.identity,
            roaming: ctx.roaming,
            services_config: ctx.services_config,
        }
    }
}

fn header_str<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn is_trusted(ip: IpAddr, trusted: &[IpNetwork]) -> bool {
    trusted.iter().any(|block| block.contains(ip))
}

/// Peer address, or the nearest untrusted `x-forwarded-for` hop when the
/// peer is a trusted proxy. Hops are walked right to left so a client
/// cannot prepend its own address.
fn client_ip(req: &Request, trusted: &[IpNetwork]) -> Option<IpAddr> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical());
    if !peer.is_some_and(|ip| is_trusted(ip, trusted)) {
        return peer;
    }
    let hops: Vec<IpAddr> = header_str(req, "x-forwarded-for")
        .into_iter()
        .flat_map(|v| v.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_canonical())
        .collect();
    hops.iter()
        .rev()
        .find(|ip| !is_trusted(**ip, trusted))
        .or_else(|| hops.first())
        .copied()
        .or(peer)
}

/// An upstream `BearerToken` extension wins; otherwise the header
/// credential (if any) goes through the resolver.
async fn resolve_bearer(
    app: &AppState,
    upstream: Option<BearerToken>,
    credential: Option<String>,
) -> keygate_core::Result<Option<BearerToken>> {
    if upstream.is_some() {
        return Ok(upstream);
    }
    let Some(credential) = credential else {
        return Ok(None);
    };
    let token = app.bearer().resolve(&credential).await?;
    if token.is_none() {
        tracing::debug!("unknown bearer credential, continuing anonymously");
    }
    Ok(token)
}

pub fn request_input(app: &AppState, req: &Request, bearer: Option<BearerToken>) -> RequestInput {
    let gw = &app.cfg().gateway;
    RequestInput {
        key: header_str(req, &gw.key_header).map(str::to_string),
        method: req.method().as_str().to_string(),
        route_path: req.uri().path().to_string(),
        client_ip: client_ip(req, app.trusted_proxies()),
        user_agent: header_str(req, "user-agent").map(str::to_string),
        bearer,
        session_id: header_str(req, &gw.session_header).map(str::to_string),
    }
}

fn status_of(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Denial: status and code headers only.
fn denial_response(err: &KeygateError) -> Response {
    let code = err.code();
    (
        status_of(code),
        [(CODE_HEADER, code.numeric().to_string()), (ERROR_HEADER, code.as_str().to_string())],
    )
        .into_response()
}

fn internal_response(detail: &str) -> Response {
    let code = ErrorCode::InternalException;
    let body = json!({
        "result": false,
        "errors": {
            "codes": [code.numeric()],
            "details": [{ "code": code.numeric(), "message": detail }]
        }
    });
    (status_of(code), Json(body)).into_response()
}

fn panic_message(p: &(dyn Any + Send)) -> String {
    p.downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| p.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "pipeline panicked".into())
}

fn append_headers(res: &mut Response, headers: &[(String, String)]) {
    for (name, value) in headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(n), Ok(v)) => {
                res.headers_mut().insert(n, v);
            }
            _ => tracing::warn!(header = %name, "authorization header dropped"),
        }
    }
}

pub async fn authorize(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let upstream = req.extensions().get::<BearerToken>().cloned();
    let credential = header_str(&req, "authorization")
        .and_then(bearer_credential)
        .map(str::to_string);
    let bearer = match resolve_bearer(&app, upstream, credential).await {
        Ok(bearer) => bearer,
        Err(e) => {
            tracing::error!(error = %e, "bearer resolution failed");
            return internal_response(&e.to_string());
        }
    };
    let input = request_input(&app, &req, bearer);
    let run = AssertUnwindSafe(app.pipeline().authorize(input))
        .catch_unwind()
        .await;

    match run {
        Ok(Ok(Outcome::Bypassed)) => next.run(req).await,
        Ok(Ok(Outcome::Proceed(ctx))) => {
            let headers = ctx.response_headers.clone();
            req.extensions_mut().insert(Authorized::from(*ctx));
            let mut res = next.run(req).await;
            append_headers(&mut res, &headers);
            res
        }
        Ok(Err(e)) if e.code() == ErrorCode::InternalException => {
            tracing::error!(error = %e, code = e.code().numeric(), "authorization internal error");
            internal_response(&e.to_string())
        }
        Ok(Err(e)) => denial_response(&e),
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!(code = ErrorCode::InternalException.numeric(), %detail, "authorization panicked");
            internal_response(&detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn from_peer(peer: &str, forwarded: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/orders/list");
        if let Some(v) = forwarded {
            builder = builder.header("x-forwarded-for", v);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo(SocketAddr::new(peer.parse().unwrap(), 40000)));
        req
    }

    fn blocks(raw: &[&str]) -> Vec<IpNetwork> {
        raw.iter().map(|b| b.parse().unwrap()).collect()
    }

    #[test]
    fn forwarded_header_ignored_from_untrusted_peer() {
        let req = from_peer("203.0.113.9", Some("10.1.2.3"));
        assert_eq!(client_ip(&req, &[]), Some("203.0.113.9".parse().unwrap()));
        let trusted = blocks(&["10.0.0.0/8"]);
        assert_eq!(client_ip(&req, &trusted), Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn forwarded_header_used_behind_trusted_proxy() {
        let trusted = blocks(&["10.0.0.0/8"]);
        let req = from_peer("10.0.0.1", Some("198.51.100.7"));
        assert_eq!(client_ip(&req, &trusted), Some("198.51.100.7".parse().unwrap()));

        // A spoofed leftmost hop is skipped in favour of the last untrusted one.
        let req = from_peer("10.0.0.1", Some("1.2.3.4, 198.51.100.7, 10.0.0.2"));
        assert_eq!(client_ip(&req, &trusted), Some("198.51.100.7".parse().unwrap()));

        let req = from_peer("10.0.0.1", None);
        assert_eq!(client_ip(&req, &trusted), Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn mapped_peer_address_is_canonical() {
        let trusted = blocks(&["127.0.0.0/8"]);
        let req = from_peer("::ffff:127.0.0.1", Some("198.51.100.7"));
        assert_eq!(client_ip(&req, &trusted), Some("198.51.100.7".parse().unwrap()));
    }

    #[test]
    fn denial_has_no_body_and_carries_code() {
        let res = denial_response(&KeygateError::GeoDenied);
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()[CODE_HEADER], "155");
        assert_eq!(res.headers()[ERROR_HEADER], "GEO_DENIED");
    }

    #[test]
    fn key_errors_are_unauthorized() {
        let res = denial_response(&KeygateError::MissingOrInvalidKey);
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[CODE_HEADER], "153");
    }

    #[test]
    fn panic_payloads_are_described() {
        let p: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p.as_ref()), "boom");
        let p: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(p.as_ref()), "bang");
        let p: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(p.as_ref()), "pipeline panicked");
    }
}
