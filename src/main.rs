//! Disk browser server.
//!
//! Reads [`AppConfig`] from the environment, wires the in-memory stores and
//! the reqwest client into [`DiskService`] and serves the router until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bridge_server::{MemoryCacheStore, MemorySessionStore, ReqwestHttpClient};
use core_runtime::config::AppConfig;
use core_runtime::logging::init_logging;
use core_service::{DiskService, ServiceDependencies};
use disk_web::{router, AppState};
use provider_yandex_disk::YandexDiskConnector;
use tracing::{debug, info, warn};

const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(config.logging.clone()).context("failed to initialise logging")?;

    debug!(?config, "Loaded configuration");

    let http_client = Arc::new(
        ReqwestHttpClient::new(config.http_timeout).context("failed to build HTTP client")?,
    );
    let sessions = Arc::new(MemorySessionStore::new(config.session_ttl));
    let cache = Arc::new(MemoryCacheStore::new(config.cache_capacity));
    let provider = Arc::new(YandexDiskConnector::new(http_client.clone()));

    let deps = ServiceDependencies::new(http_client, provider, cache, sessions.clone());
    let service = DiskService::new(&config, deps);
    let app = router(AppState::new(service, &config));

    let pruner = tokio::spawn(prune_sessions(sessions));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Disk browser listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pruner.abort();
    info!("Disk browser stopped");
    Ok(())
}

async fn prune_sessions(sessions: Arc<MemorySessionStore>) {
    let mut interval = tokio::time::interval(SESSION_PRUNE_INTERVAL);
    loop {
        interval.tick().await;
        let removed = sessions.prune_expired().await;
        if removed > 0 {
            debug!(removed, "Pruned expired sessions");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
        return;
    }
    info!("Shutdown requested");
}
