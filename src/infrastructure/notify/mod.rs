//! Alert delivery adapters

mod mail;

pub use mail::{MailMessage, OutboxNotifier};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::alert::{AlertEvent, Notifier};
use crate::shared::errors::NotifyError;

/// Writes alerts to the log. Used when no mail recipients are configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        warn!(
            price = event.price,
            direction = %event.direction,
            "🔔 {}",
            event.message
        );
        Ok(())
    }
}
