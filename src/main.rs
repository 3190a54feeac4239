//! tiercache host process
//!
//! Builds the cache tiers and coordinator, runs the maintenance scheduler and
//! serves the ops endpoints until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiercache::api::{create_router, AppState};
use tiercache::cache::{CacheCoordinator, CacheTier, CoordinatorSettings, MemoryTier};
use tiercache::config::Config;
use tiercache::records::{InMemoryRecordStore, RecordStore};
use tiercache::scheduler::{shutdown_channel, PeriodicScheduler, ShutdownTrigger};
use tiercache::tasks::register_maintenance_jobs;

/// Budget of the in-process remote tier used when no Redis URL is configured.
const LOCAL_REMOTE_TIER_MAX_BYTES: usize = 512 * 1024 * 1024;

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build fast and remote tiers and the cache coordinator
/// 4. Register maintenance jobs and start the scheduler
/// 5. Serve the ops endpoints
/// 6. On SIGINT/SIGTERM stop the server, then wait for every job loop to exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiercache");

    let config = Config::from_env();
    info!(
        fast_tier_max_bytes = config.fast_tier_max_bytes,
        fast_tier_ttl_ceiling_secs = config.fast_tier_ttl_ceiling.as_secs(),
        default_ttl_secs = config.default_ttl.as_secs(),
        strict_patterns = config.strict_patterns,
        port = config.server_port,
        "Configuration loaded"
    );

    let fast_tier = Arc::new(MemoryTier::new("fast", config.fast_tier_max_bytes));
    let remote_tier = build_remote_tier(&config);
    let cache = Arc::new(CacheCoordinator::new(
        fast_tier.clone(),
        remote_tier,
        CoordinatorSettings::from(&config),
    ));

    // Stand-in until the host wires its database-backed store.
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());

    let mut scheduler = PeriodicScheduler::new();
    register_maintenance_jobs(&mut scheduler, &config, cache.clone(), store, fast_tier.clone())
        .context("failed to register maintenance jobs")?;
    let state = AppState::new(cache, fast_tier, scheduler.board());

    let (trigger, shutdown) = shutdown_channel();
    let scheduler_handle = scheduler.start(shutdown);
    info!("Maintenance scheduler started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Ops server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(trigger))
        .await
        .context("ops server failed")?;

    // In-flight job runs finish before their loops exit.
    scheduler_handle.await.context("scheduler task failed")?;
    info!("Shutdown complete");
    Ok(())
}

#[cfg(feature = "redis")]
fn build_remote_tier(config: &Config) -> Arc<dyn CacheTier> {
    use tiercache::cache::RedisTier;

    if let Some(url) = &config.redis_url {
        match RedisTier::connect(url) {
            Ok(tier) => {
                info!("Using Redis remote tier");
                return Arc::new(tier);
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, falling back to in-process remote tier")
            }
        }
    }
    Arc::new(MemoryTier::new("remote", LOCAL_REMOTE_TIER_MAX_BYTES))
}

#[cfg(not(feature = "redis"))]
fn build_remote_tier(config: &Config) -> Arc<dyn CacheTier> {
    if config.redis_url.is_some() {
        warn!("REDIS_URL set but built without the `redis` feature, using in-process remote tier");
    }
    Arc::new(MemoryTier::new("remote", LOCAL_REMOTE_TIER_MAX_BYTES))
}

/// Waits for Ctrl+C or SIGTERM, then fires the scheduler's shutdown trigger.
async fn shutdown_signal(trigger: ShutdownTrigger) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    trigger.trigger();
    info!("Shutdown signalled to maintenance jobs");
}
