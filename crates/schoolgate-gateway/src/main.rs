//! schoolgate gateway binary.
//!
//! - Loads `schoolgate.yaml` (or `$SCHOOLGATE_CONFIG`), strict + validated
//! - Builds backends, state and router
//! - Runs the rate-limit sweeper
//! - Marks the process draining on Ctrl-C and shuts down gracefully

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use schoolgate_gateway::{app_state::AppState, config, infra::Backends, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_env()?;
    let listen: SocketAddr = cfg.gateway.listen.parse()?;
    let sweep_every = Duration::from_secs(cfg.rate_limit.sweep_interval_secs);

    let backends = Backends::from_config(&cfg.backend)?;
    let state = AppState::new(cfg, backends)?;
    let _sweeper = state.limiter().spawn_sweeper(sweep_every);
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "schoolgate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    state.metrics().set_draining();
    tracing::info!("shutdown requested, draining");
}
