//! Periodic live-price ingestion

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, info_span, warn, Instrument};

use super::pipeline::PricePipeline;
use crate::shared::utils::generate_id;

/// How many cycles may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// Every tick spawns a cycle, however many are still running
    Unbounded,
    /// At most `n` cycles; a tick with no free slot is skipped
    Bounded(usize),
}

impl ConcurrencyPolicy {
    /// `0` means unbounded
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            ConcurrencyPolicy::Unbounded
        } else {
            ConcurrencyPolicy::Bounded(limit)
        }
    }
}

/// Counters reported when the scheduler stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub ticks: u64,
    pub spawned: u64,
    pub skipped: u64,
}

/// Fixed-period timer that spawns one live ingestion cycle per tick.
///
/// The timer never waits for a cycle: slow feeds make cycles overlap rather
/// than delay the next tick.
pub struct IngestionScheduler {
    pipeline: Arc<PricePipeline>,
    period: Duration,
    policy: ConcurrencyPolicy,
    slots: Option<Arc<Semaphore>>,
}

impl IngestionScheduler {
    pub fn new(pipeline: Arc<PricePipeline>, period: Duration, policy: ConcurrencyPolicy) -> Self {
        let slots = match policy {
            ConcurrencyPolicy::Unbounded => None,
            ConcurrencyPolicy::Bounded(n) => Some(Arc::new(Semaphore::new(n))),
        };
        Self {
            pipeline,
            period,
            policy,
            slots,
        }
    }

    /// Tick until `shutdown` flips to `true` (or its sender is dropped).
    /// Cycles already running are left to finish on their own.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> SchedulerReport {
        info!(
            "⏱️  Ingestion scheduler started: every {:?}, policy {:?}",
            self.period, self.policy
        );

        let mut report = SchedulerReport::default();
        // first cycle one period after start, like a plain ticker
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    report.ticks += 1;
                    if self.spawn_cycle() {
                        report.spawned += 1;
                    } else {
                        report.skipped += 1;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(
            "Ingestion scheduler stopped after {} ticks ({} skipped)",
            report.ticks, report.skipped
        );
        report
    }

    fn spawn_cycle(&self) -> bool {
        let permit = match &self.slots {
            None => None,
            Some(slots) => match Arc::clone(slots).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!("All ingestion slots busy, skipping tick");
                    return false;
                }
            },
        };

        let pipeline = Arc::clone(&self.pipeline);
        let span = info_span!("cycle", id = %generate_id());
        tokio::spawn(
            async move {
                let _permit = permit;
                match pipeline.record_live().await {
                    Ok(sample) => info!("Added price {} {} for {}", sample.price, sample.currency, sample.date),
                    Err(e) => warn!("Ingestion cycle abandoned: {}", e),
                }
            }
            .instrument(span),
        );
        true
    }
}
