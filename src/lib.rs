//! Healthcare coordination backend connecting doctors, a government health
//! department, and migrant workers.
//!
//! REST mutation and aggregation services over an embedded SQLite store,
//! plus a best-effort WebSocket broadcast channel for near-real-time
//! dashboards.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
pub mod state;
pub mod stats;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

/// Initialize logging, the database, and demo data, then serve until
/// ctrl-c.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = Config::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        data_dir = %cfg.data_dir.display(),
        "{} starting", config::APP_NAME
    );

    std::fs::create_dir_all(&cfg.data_dir)?;
    std::fs::create_dir_all(cfg.voice_notes_dir())?;

    let conn = db::init_database(&cfg.database_path())?;
    if cfg.demo_mode {
        seed::seed_demo_data(&conn)?;
    }
    drop(conn);

    let state = Arc::new(AppState::from_config(&cfg));
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let mut server = api::start_server(state, addr, &cfg.frontend_origin).await?;

    tracing::info!(
        api = %format!("http://localhost:{}/api", server.addr.port()),
        ws = %format!("ws://localhost:{}/ws", server.addr.port()),
        "server ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("ctrl-c received, shutting down");
    server.shutdown();
    server.join().await;

    Ok(())
}
