//! Sample domain - persisted price observations

mod sample_repository;

pub use sample_repository::SampleRepository;

use serde::Serialize;

use crate::domain::price::PriceQuote;
use crate::shared::types::{AssetPair, CalendarDate};
use crate::shared::utils::round_to_minor_units;

/// One stored observation. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub price: f64,
    /// Logical day the sample represents; may differ from the capture day
    pub date: CalendarDate,
    pub currency: String,
    pub asset: String,
}

impl Sample {
    pub fn new(pair: &AssetPair, price: f64, date: CalendarDate, timestamp: i64) -> Self {
        Self {
            timestamp,
            price: round_to_minor_units(price, &pair.currency),
            date,
            currency: pair.currency.clone(),
            asset: pair.asset.clone(),
        }
    }

    /// Sample from the scheduled current-price fetch, dated `today`
    pub fn live(pair: &AssetPair, quote: PriceQuote, today: CalendarDate) -> Self {
        Self::new(pair, quote.price, today, quote.fetched_at)
    }

    /// Sample from an on-demand historical fetch, stamped at the start of `date`
    pub fn backfill(pair: &AssetPair, quote: PriceQuote, date: CalendarDate) -> Self {
        Self::new(pair, quote.price, date, date.start_of_day_ms())
    }
}
