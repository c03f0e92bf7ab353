mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use whispr_api::AppStateInner;
use whispr_db::Database;
use whispr_gateway::Dispatcher;
use whispr_store::WhisprBuilder;
use whispr_store::persist::{JsonSnapshotFile, MemorySnapshotStore, SnapshotStore};

use crate::config::{Backend, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whispr=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let backend: Arc<dyn SnapshotStore> = match config.backend {
        Backend::Sqlite => Arc::new(Database::open(&config.db_path)?),
        Backend::Json => {
            info!("Using JSON state file at {}", config.state_path.display());
            Arc::new(JsonSnapshotFile::new(&config.state_path))
        }
        Backend::Memory => {
            warn!("Using in-memory backend, nothing will survive a restart");
            Arc::new(MemorySnapshotStore::new())
        }
    };

    let dispatcher = Dispatcher::new();
    let whispr = WhisprBuilder::with_backend(backend)
        .notifier(dispatcher.clone())
        .debounce(config.flush_debounce)
        .seed_samples(config.seed_samples)
        .open()
        .await?;

    let app = whispr_api::router(AppStateInner::new(whispr.clone(), dispatcher))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Whispr server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Final write of anything still inside the debounce window
    whispr.shutdown().await?;
    info!("State flushed, bye");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
