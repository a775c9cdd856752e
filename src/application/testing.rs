//! In-process fakes for application tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::pipeline::PricePipeline;
use crate::domain::alert::{AlertEvaluator, AlertEvent, AlertThreshold, Notifier};
use crate::domain::price::{PriceFeed, PriceQuote};
use crate::domain::sample::SampleRepository;
use crate::shared::errors::{FeedError, NotifyError};
use crate::shared::types::{AssetPair, CalendarDate};
use crate::shared::utils::now_ms;

enum Behavior {
    Prices(VecDeque<f64>),
    Fail(FeedError),
    Stall,
}

struct FeedState {
    behavior: Behavior,
    last_price: f64,
    calls: Vec<Option<CalendarDate>>,
}

/// Scripted price feed that records every request
#[derive(Clone)]
pub struct FakeFeed {
    state: Arc<Mutex<FeedState>>,
}

impl FakeFeed {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                behavior,
                last_price: 0.0,
                calls: Vec::new(),
            })),
        }
    }

    /// Serves the prices in order, then keeps repeating the last one
    pub fn with_prices(prices: &[f64]) -> Self {
        Self::with_behavior(Behavior::Prices(prices.iter().copied().collect()))
    }

    pub fn failing(err: FeedError) -> Self {
        Self::with_behavior(Behavior::Fail(err))
    }

    /// Accepts the request and never answers
    pub fn stalled() -> Self {
        Self::with_behavior(Behavior::Stall)
    }

    pub fn calls(&self) -> Vec<Option<CalendarDate>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

#[async_trait]
impl PriceFeed for FakeFeed {
    async fn fetch(&self, _asset: &str, date: Option<CalendarDate>) -> Result<PriceQuote, FeedError> {
        let outcome = {
            let mut guard = self.state.lock().unwrap();
            let state = &mut *guard;
            state.calls.push(date);
            match &mut state.behavior {
                Behavior::Prices(queue) => {
                    let price = queue.pop_front().unwrap_or(state.last_price);
                    state.last_price = price;
                    Some(Ok(price))
                }
                Behavior::Fail(err) => Some(Err(err.clone())),
                Behavior::Stall => None,
            }
        };

        match outcome {
            Some(Ok(price)) => Ok(PriceQuote {
                price,
                fetched_at: now_ms(),
            }),
            Some(Err(err)) => Err(err),
            None => std::future::pending().await,
        }
    }
}

/// Forwards every alert to an inbox the test can read
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

pub struct AlertInbox {
    rx: mpsc::UnboundedReceiver<AlertEvent>,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, AlertInbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), AlertInbox { rx })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        self.tx.send(event.clone()).map_err(|_| NotifyError::Closed)
    }
}

impl AlertInbox {
    /// Next alert, or `None` if nothing arrives shortly
    pub async fn next_event(&mut self) -> Option<AlertEvent> {
        tokio::time::timeout(Duration::from_millis(200), self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

/// Pipeline for `bitcoin`/`usd` with a 20000..30000 band
pub fn pipeline_with(
    feed: FakeFeed,
    store: Arc<dyn SampleRepository>,
    notifier: Arc<dyn Notifier>,
) -> PricePipeline {
    PricePipeline::new(
        AssetPair::default(),
        Arc::new(feed),
        store,
        AlertEvaluator::new("bitcoin", AlertThreshold::new(20_000.0, 30_000.0)),
        notifier,
    )
}
