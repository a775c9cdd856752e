//! Price feed interface

use async_trait::async_trait;

use super::PriceQuote;
use crate::shared::errors::FeedError;
use crate::shared::types::CalendarDate;

/// Source of current and historical prices for an asset.
///
/// `date = None` asks for the live market price, `Some(day)` for the price the
/// provider recorded for that day. Implementations never retry.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self, asset: &str, date: Option<CalendarDate>) -> Result<PriceQuote, FeedError>;
}
