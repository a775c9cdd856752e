// src/app.rs
use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::api::{self, ApiState};
use crate::application::{ConcurrencyPolicy, IngestionScheduler, PricePipeline, PriceQueryService};
use crate::domain::alert::{AlertEvaluator, AlertThreshold, Notifier};
use crate::infrastructure::coingecko::CoinGeckoClient;
use crate::infrastructure::notify::{LogNotifier, MailMessage, OutboxNotifier};
use crate::infrastructure::storage::SqliteSampleStore;
use crate::shared::config::Config;
use crate::shared::errors::StoreError;

const IN_MEMORY: &str = ":memory:";

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, config, shutdown_signal()).await
}

/// Wire store, feed, scheduler and API on an already bound listener.
/// Returns once `shutdown` resolves and the scheduler has stopped.
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = Arc::new(open_store(&config)?);

    let pipeline = Arc::new(build_pipeline(&config, store));

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = IngestionScheduler::new(
        Arc::clone(&pipeline),
        Duration::from_secs(config.scheduler.interval_secs),
        ConcurrencyPolicy::from_limit(config.scheduler.max_concurrent_cycles),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(stop_rx));

    let state = ApiState::new(PriceQueryService::new(pipeline), &config);
    let app = api::router(state);

    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown requested");
            let _ = stop_tx.send(true);
        })
        .await
        .context("HTTP server failed")?;

    match scheduler_handle.await {
        Ok(report) => info!(
            "✅ Stopped: {} ticks, {} cycles spawned, {} skipped",
            report.ticks, report.spawned, report.skipped
        ),
        Err(e) => error!("Scheduler task failed: {}", e),
    }
    Ok(())
}

/// Open the configured store; `:memory:` selects a private in-memory database
pub fn open_store(config: &Config) -> Result<SqliteSampleStore, StoreError> {
    if config.store.path == IN_MEMORY {
        SqliteSampleStore::open_in_memory()
    } else {
        SqliteSampleStore::open(
            Path::new(&config.store.path),
            config.store.pool_size,
            config.store.reset_on_start,
        )
    }
}

pub fn build_feed(config: &Config) -> CoinGeckoClient {
    CoinGeckoClient::new(config.feed.base_url.clone(), config.feed.currency.clone())
}

pub fn build_pipeline(config: &Config, store: Arc<SqliteSampleStore>) -> PricePipeline {
    let evaluator = AlertEvaluator::new(
        config.feed.asset.clone(),
        AlertThreshold::new(config.alert.min, config.alert.max),
    );
    PricePipeline::new(
        config.asset_pair(),
        Arc::new(build_feed(config)),
        store,
        evaluator,
        build_notifier(config),
    )
}

/// Mail outbox when recipients are configured, log-only otherwise.
/// Must be called inside a runtime: the outbox consumer is spawned here.
pub fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    match &config.notify {
        Some(cfg) => {
            let (notifier, outbox) = OutboxNotifier::new(cfg);
            tokio::spawn(drain_outbox(outbox));
            info!("📧 Alerts go to {}", cfg.to.join(", "));
            Arc::new(notifier)
        }
        None => {
            info!("No [notify] section, alerts are logged only");
            Arc::new(LogNotifier)
        }
    }
}

/// Mail submission seam: every queued message is logged in wire form
async fn drain_outbox(mut outbox: mpsc::UnboundedReceiver<MailMessage>) {
    while let Some(mail) = outbox.recv().await {
        info!(to = %mail.to.join(";"), "Submitting alert mail\n{}", mail.to_mime());
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
