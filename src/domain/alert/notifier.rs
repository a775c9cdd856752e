use async_trait::async_trait;

use super::AlertEvent;
use crate::shared::errors::NotifyError;

/// Outbound alert delivery. Callers treat failures as log-only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError>;
}
