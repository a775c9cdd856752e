//! Utility functions and helpers

use chrono::Utc;

/// Number of minor-unit digits for a quote currency (cents for `usd`)
pub fn minor_unit_digits(currency: &str) -> u32 {
    match currency.to_ascii_lowercase().as_str() {
        "jpy" | "krw" | "vnd" => 0,
        "btc" | "eth" | "sats" => 8,
        _ => 2,
    }
}

/// Round a price to the currency's minor unit, half away from zero
pub fn round_to_minor_units(price: f64, currency: &str) -> f64 {
    let scale = 10_f64.powi(minor_unit_digits(currency) as i32);
    (price * scale).round() / scale
}

/// Current wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Short identifier for log correlation
pub fn generate_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
