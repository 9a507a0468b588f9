//! Server initialization and run loop
//!
//! Opens the board database, seeds or reloads the in-memory grid, assembles
//! the service and router, and serves until interrupted.

use anyhow::{Context, Result};
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;
use tessella_board::{spawn_persistence_worker, BoardService, BoardStore, ResetGuard};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::background_tasks;
use super::config::AppConfig;

/// Run the server with the given configuration until shutdown
pub async fn run(config: AppConfig) -> Result<()> {
    let data_dir = Path::new(&config.persistence.data_dir);
    std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let db_path = data_dir.join(&config.persistence.database);

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to open board database")?;

    let store = BoardStore::new(pool);
    store
        .init()
        .await
        .context("Failed to initialize board schema")?;

    // A store missing expected records aborts startup here
    let board = store
        .load_or_initialize(
            config.board.width,
            config.board.height,
            config.board.default_rgb(),
        )
        .await
        .context("Failed to load board from storage")?;
    info!(
        width = config.board.width,
        height = config.board.height,
        db = %db_path.display(),
        "Board ready"
    );

    let store = Arc::new(store);
    let persist = spawn_persistence_worker(store.clone());
    let guard = ResetGuard::new(config.admin.reset_secret_sha256.as_str());
    let service = Arc::new(BoardService::new(
        board,
        store,
        persist,
        guard,
        config.board.cooldown_secs,
    ));

    let shutdown = CancellationToken::new();
    background_tasks::start_ledger_sweep(
        service.clone(),
        config.maintenance.ledger_sweep_interval_secs,
        shutdown.clone(),
    );

    let app = Router::new()
        .merge(crate::api::api_router(service.clone()))
        .merge(crate::websocket::sync_routes(service))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Tessella listening");

    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown_for_serve.cancel();
        })
        .await
        .context("Server error")?;

    Ok(())
}
