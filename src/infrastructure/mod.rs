//! Infrastructure layer - adapters for the price feed, storage and notifications

pub mod coingecko;
pub mod notify;
pub mod storage;
