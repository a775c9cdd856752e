//! Band breach evaluation

use super::{AlertDirection, AlertEvent, AlertThreshold};

/// Decides whether a freshly fetched price breaches the configured band
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    asset: String,
    threshold: AlertThreshold,
}

impl AlertEvaluator {
    pub fn new(asset: impl Into<String>, threshold: AlertThreshold) -> Self {
        Self {
            asset: asset.into(),
            threshold,
        }
    }

    pub fn threshold(&self) -> AlertThreshold {
        self.threshold
    }

    /// `is_live_date` must be computed per sample: true only when the sample's
    /// date is today at evaluation time. Historical prices never alert.
    pub fn evaluate(&self, price: f64, is_live_date: bool) -> Option<AlertEvent> {
        if !is_live_date {
            return None;
        }

        if price < self.threshold.min {
            return Some(AlertEvent {
                price,
                direction: AlertDirection::BelowMin,
                message: format!("Price of {} went below {}", self.asset, self.threshold.min),
            });
        }

        if price > self.threshold.max {
            return Some(AlertEvent {
                price,
                direction: AlertDirection::AboveMax,
                message: format!("Price of {} went above {}", self.asset, self.threshold.max),
            });
        }

        None
    }
}
