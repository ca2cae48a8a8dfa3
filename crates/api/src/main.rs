use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reviewsync_api::background::scheduled_sync;
use reviewsync_api::config::ServerConfig;
use reviewsync_api::router::build_app_router;
use reviewsync_api::state::AppState;
use reviewsync_db::DbConfig;
use reviewsync_serpapi::{SerpApiClient, SerpApiConfig};
use reviewsync_sync::{PgReviewStore, ReviewSyncService, SyncConfig, SyncOptions};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reviewsync_api=debug,reviewsync_sync=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let sync_config = SyncConfig::from_env();
    tracing::info!(
        dedup = %sync_config.dedup,
        page_retries = sync_config.page_retries,
        max_pages = sync_config.max_pages,
        deadline_secs = sync_config.upstream_deadline.as_secs(),
        "Loaded sync configuration"
    );
    if sync_config.upstream_deadline >= Duration::from_secs(config.request_timeout_secs) {
        tracing::warn!(
            deadline_secs = sync_config.upstream_deadline.as_secs(),
            request_timeout_secs = config.request_timeout_secs,
            "SYNC_DEADLINE_SECS is not below REQUEST_TIMEOUT_SECS; slow syncs may be cut off"
        );
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_config = DbConfig::from_env();

    let pool = reviewsync_db::create_pool(&database_url, &db_config)
        .await
        .expect("Failed to connect to database");
    tracing::info!(
        max_connections = db_config.max_connections,
        "Database connection pool created"
    );

    reviewsync_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    reviewsync_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Sync service ---
    let upstream =
        SerpApiClient::new(SerpApiConfig::from_env()).expect("Failed to build SerpApi client");
    let store = PgReviewStore::new(pool.clone(), sync_config.store_timeout);
    let sync = Arc::new(ReviewSyncService::new(upstream, store, sync_config));

    // --- Scheduled sync ---
    let sync_cancel = CancellationToken::new();
    let sync_handle = (config.sync_interval_secs > 0).then(|| {
        tokio::spawn(scheduled_sync::run(
            Arc::clone(&sync),
            Duration::from_secs(config.sync_interval_secs),
            SyncOptions {
                force: config.sync_force,
            },
            sync_cancel.clone(),
        ))
    });
    if sync_handle.is_none() {
        tracing::info!("Scheduled sync disabled (SYNC_INTERVAL_SECS=0)");
    }

    // --- App state & router ---
    let state = AppState {
        pool: pool.clone(),
        sync,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sync_cancel.cancel();
    if let Some(handle) = sync_handle {
        let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
        tracing::info!("Scheduled sync stopped");
    }

    pool.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
