//! Fetch → evaluate → persist, shared by the scheduler and the backfill path

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::alert::{AlertEvaluator, AlertEvent, Notifier};
use crate::domain::price::PriceFeed;
use crate::domain::sample::{Sample, SampleRepository};
use crate::shared::errors::PipelineError;
use crate::shared::types::{AssetPair, CalendarDate};

/// Everything needed to turn a feed quote into a stored sample
pub struct PricePipeline {
    pair: AssetPair,
    feed: Arc<dyn PriceFeed>,
    store: Arc<dyn SampleRepository>,
    evaluator: AlertEvaluator,
    notifier: Arc<dyn Notifier>,
}

impl PricePipeline {
    pub fn new(
        pair: AssetPair,
        feed: Arc<dyn PriceFeed>,
        store: Arc<dyn SampleRepository>,
        evaluator: AlertEvaluator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pair,
            feed,
            store,
            evaluator,
            notifier,
        }
    }

    pub fn pair(&self) -> &AssetPair {
        &self.pair
    }

    pub fn store(&self) -> &Arc<dyn SampleRepository> {
        &self.store
    }

    /// Fetch the live price, dated today
    pub async fn record_live(&self) -> Result<Sample, PipelineError> {
        let today = CalendarDate::today();
        let quote = self.feed.fetch(&self.pair.asset, None).await?;
        self.persist(Sample::live(&self.pair, quote, today)).await
    }

    /// Fetch the price the provider recorded for `date`
    pub async fn record_historical(&self, date: CalendarDate) -> Result<Sample, PipelineError> {
        let quote = self.feed.fetch(&self.pair.asset, Some(date)).await?;
        self.persist(Sample::backfill(&self.pair, quote, date)).await
    }

    async fn persist(&self, sample: Sample) -> Result<Sample, PipelineError> {
        // "today" is re-read per sample so a cycle straddling midnight is not live
        if let Some(event) = self.evaluator.evaluate(sample.price, sample.date.is_today()) {
            self.dispatch(event);
        }

        self.store.insert(&sample).await?;
        debug!("Added price {} for {}", sample.price, sample.date);
        Ok(sample)
    }

    /// Hand the alert to the notifier on a detached task
    fn dispatch(&self, event: AlertEvent) {
        info!("🚨 {} (price {}, {})", event.message, event.price, event.direction);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&event).await {
                warn!("Alert notification failed: {}", e);
            }
        });
    }
}
