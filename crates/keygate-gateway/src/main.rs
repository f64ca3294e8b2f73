//! keygate gateway
//!
//! Runs the per-request authorization pipeline (key, geo, device, session,
//! identity, ACL) in front of a stand-in upstream.
//! - Config: `KEYGATE_CONFIG` or `keygate.yaml`
//! - Logging: `RUST_LOG`

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use keygate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("KEYGATE_CONFIG").unwrap_or_else(|_| "keygate.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "keygate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
