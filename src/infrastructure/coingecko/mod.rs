//! CoinGecko-compatible price feed

mod client;

pub use client::{extract_price, CoinGeckoClient};
