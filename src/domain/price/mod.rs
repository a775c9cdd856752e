//! Price domain - quotes fetched from the external feed

mod price_feed;

pub use price_feed::PriceFeed;

/// Price observed at the feed, before it becomes a stored sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    /// Epoch milliseconds when the response was received
    pub fetched_at: i64,
}
