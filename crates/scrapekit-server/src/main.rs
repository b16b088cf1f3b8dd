//! scrapekit server
//!
//! - Demo routes: `/`, `/health`, `/slow`, `/error`
//! - Scrape endpoint: `/metrics`
//! - Every request counted and timed by the instrumentation middleware

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use scrapekit_core::error::{Result, ScrapeError};
use scrapekit_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "scrapekit-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| ScrapeError::BadConfig(format!("server.listen: {e}")))?;

    // Registry and metric families exist before the listener accepts anything.
    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ScrapeError::Internal(format!("failed to bind {listen}: {e}")))?;
    tracing::info!(%listen, "scrapekit-server starting");
    tracing::info!("metrics available at http://{listen}/metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ScrapeError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
