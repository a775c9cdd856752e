use async_trait::async_trait;

use super::Sample;
use crate::shared::errors::StoreError;
use crate::shared::types::CalendarDate;

/// Append-only sample storage.
///
/// Every call is atomic on its own; implementations must accept concurrent
/// inserts from overlapping ingestion cycles and concurrent reads.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Append a row. Identical samples are stored twice.
    async fn insert(&self, sample: &Sample) -> Result<(), StoreError>;

    /// Number of rows whose logical date equals `date`
    async fn count_by_date(&self, date: CalendarDate) -> Result<u64, StoreError>;

    /// Rows for `date` in insertion order, skipping `offset`, at most `limit`
    async fn query_by_date(
        &self,
        date: CalendarDate,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Sample>, StoreError>;
}
