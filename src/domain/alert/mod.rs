//! Alert domain - band breach detection and notification seam

mod alert_evaluator;
mod notifier;

pub use alert_evaluator::AlertEvaluator;
pub use notifier::Notifier;

use serde::Serialize;
use std::fmt;

/// Configured price band, immutable after startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThreshold {
    pub min: f64,
    pub max: f64,
}

impl AlertThreshold {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertDirection {
    BelowMin,
    AboveMax,
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertDirection::BelowMin => write!(f, "below-min"),
            AlertDirection::AboveMax => write!(f, "above-max"),
        }
    }
}

/// Band breach raised for a live price. Consumed once by a notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub price: f64,
    pub direction: AlertDirection,
    pub message: String,
}
