//! Common types used across the application

use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::ValidationError;

/// Wire format of every calendar date the service stores or accepts (`31-12-2024`)
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Logical calendar day a sample represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Current UTC day
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Epoch milliseconds of 00:00 UTC on this day
    pub fn start_of_day_ms(&self) -> i64 {
        let midnight = self.0.and_hms_opt(0, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&midnight).timestamp_millis()
    }

    pub fn is_today(&self) -> bool {
        *self == Self::today()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts single-digit fields for %d/%m; the wire format is fixed width
        if s.len() != 10 {
            return Err(ValidationError::Date(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::Date(s.to_string()))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The single asset the service tracks and the currency it is quoted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPair {
    /// Feed-side identifier, e.g. `bitcoin`
    pub asset: String,
    /// Quote currency code, e.g. `usd`
    pub currency: String,
}

impl AssetPair {
    pub fn new(asset: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            currency: currency.into(),
        }
    }
}

impl Default for AssetPair {
    fn default() -> Self {
        Self::new("bitcoin", "usd")
    }
}
