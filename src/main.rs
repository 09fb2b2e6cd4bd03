use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use dairy_store_api as api;
use api::services::{AdminService, BatchService, RetryConfig};
use api::storage::{
    BatchStore, DbBatchStore, DbRecordStore, MemoryBatchStore, MemoryRecordStore, RecordStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Pick the storage backend
    let (batch_store, record_store, db): (
        Arc<dyn BatchStore>,
        Arc<dyn RecordStore>,
        Option<Arc<api::db::DbPool>>,
    ) = if cfg.uses_database_backend() {
        let pool = api::db::establish_connection_from_app_config(&cfg).await?;
        if cfg.auto_migrate {
            api::db::run_migrations(&pool).await.map_err(|e| {
                error!("Failed running migrations: {}", e);
                e
            })?;
        }
        let db = Arc::new(pool);
        (
            Arc::new(DbBatchStore::new(db.clone())) as Arc<dyn BatchStore>,
            Arc::new(DbRecordStore::new(db.clone())) as Arc<dyn RecordStore>,
            Some(db),
        )
    } else {
        info!("Using in-memory storage backend");
        (
            Arc::new(MemoryBatchStore::seeded()) as Arc<dyn BatchStore>,
            Arc::new(MemoryRecordStore::new()) as Arc<dyn RecordStore>,
            None,
        )
    };

    let retry = RetryConfig {
        max_attempts: cfg.consume_retry_attempts,
        base_delay: Duration::from_millis(cfg.consume_retry_base_delay_ms),
    };

    let app_state = api::AppState {
        batch_service: BatchService::with_retry(batch_store.clone(), record_store.clone(), retry),
        admin_service: AdminService::new(batch_store, record_store),
        config: cfg.clone(),
        db,
    };

    // CORS: explicit origins when configured, permissive only in development
    let cors_layer = if let Some(raw) = cfg.cors_allowed_origins.as_ref() {
        let origins: Vec<_> = raw
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<http::HeaderValue>().ok()
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_development() {
        info!("Using permissive CORS (development environment)");
        CorsLayer::permissive()
    } else {
        anyhow::bail!("missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS");
    };

    let app = api::api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors_layer)
        .with_state(app_state);

    let host = cfg
        .host
        .parse()
        .with_context(|| format!("invalid listen host {:?}", cfg.host))?;
    let addr = SocketAddr::new(host, cfg.port);
    info!("dairy-store-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
