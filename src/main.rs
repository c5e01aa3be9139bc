//! FitSync - A local fitness tracker with session timers and daily stats
//!
//! This is the main entry point for the fitsync application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use fitsync::{
    config::Config,
    state::AppState,
    api::create_router,
    services::UnconfiguredGenerator,
    storage::{FileStore, KeyValueStore, MemoryStore, Storage, SystemClock},
    tasks::PersistHandle,
    timer::SessionPlan,
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("fitsync={},tower_http=info", config.log_level()))
        .init();

    info!("Starting fitsync server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, rest={}s, rounds={}",
          config.host, config.port, config.rest_seconds, config.rounds);

    let backend: Arc<dyn KeyValueStore> = if config.ephemeral {
        warn!("Running with an in-memory store, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        let dir = config
            .data_dir()
            .context("no data directory available, pass --data-dir or --ephemeral")?;
        info!("Data directory: {}", dir.display());
        Arc::new(FileStore::new(dir))
    };

    let defaults = config.session_defaults();
    SessionPlan::workout(defaults.rest_seconds, defaults.rounds)
        .context("invalid --rest-seconds/--rounds")?;

    // Start the persistence writer and build the application state
    let writer = PersistHandle::spawn(Arc::clone(&backend));
    let storage = Storage::new(backend, writer, Arc::new(SystemClock));
    let state = Arc::new(AppState::new(
        storage,
        Arc::new(UnconfiguredGenerator),
        defaults,
        config.port,
        config.host.clone(),
    ));
    state.preload();

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status                 - Uptime, stats and sessions");
    info!("  GET  /stats, /stats/:key     - Persisted stats");
    info!("  *    /water, /calories       - Daily trackers");
    info!("  *    /tasks                  - Workout checklist");
    info!("  *    /blogs                  - Featured articles and likes");
    info!("  POST /sessions/:kind/start   - Start a workout, meditation or yoga session");
    info!("  *    /chat                   - Assistant chat");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for signals: {}", e),
            }
        }
    }

    state.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}
