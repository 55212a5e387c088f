use std::sync::Arc;

use anyhow::Context;
use common::cache::{ListCache, MemoryCache, RedisCache};
use common::storage::filesystem::FilesystemUploadStore;
use common::{CacheBackendKind, CacheConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use worship_server::config::AppConfig;
use worship_server::state::AppState;
use worship_server::{build_router, database, seed};

async fn init_cache(config: &CacheConfig) -> anyhow::Result<Arc<dyn ListCache>> {
    match config.backend {
        CacheBackendKind::Redis => {
            let cache = RedisCache::connect(&config.url)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", config.url))?;
            info!(url = %config.url, "Using Redis list cache");
            Ok(Arc::new(cache))
        }
        CacheBackendKind::Memory => {
            info!("Using in-memory list cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.uses_insecure_defaults() {
        warn!(
            "Running with the default JWT secret or admin password; \
             set WORSHIP__AUTH__JWT_SECRET and WORSHIP__BOOTSTRAP__ADMIN_PASSWORD"
        );
    }

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::seed_admin(&db, &config.bootstrap)
        .await
        .context("Failed to seed admin account")?;

    let cache = init_cache(&config.cache).await?;

    let uploads = FilesystemUploadStore::new(
        &config.storage.upload_dir,
        config.storage.max_upload_size,
    )
    .await
    .with_context(|| format!("Failed to prepare upload dir {}", config.storage.upload_dir))?;
    info!(dir = %uploads.base_path().display(), "Upload storage ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        cache,
        uploads: Arc::new(uploads),
        config,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
