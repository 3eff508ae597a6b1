//! hepscope web server
//!
//! Run with: cargo run -p hepscope-web

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hepscope_web::config::Config;
use hepscope_web::router::build_router;
use hepscope_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before the subscriber, so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting hepscope {}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Could not read .env: {e}");
        }
    }

    let config = Config::load()?;
    info!(
        inspire = %config.inspire.api_url,
        ai = %config.ai.base_url,
        prefetch = config.pdf.prefetch,
        idle_timeout_secs = config.session.idle_timeout_secs,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config)?);
    state.spawn_session_sweeper(Duration::from_secs(config.session.sweep_interval_secs.max(1)));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
