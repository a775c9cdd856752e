//! Paginated reads with historical backfill on a miss

use std::sync::Arc;
use tracing::info;

use super::pipeline::PricePipeline;
use crate::domain::sample::Sample;
use crate::shared::errors::PipelineError;
use crate::shared::types::CalendarDate;

/// One page of stored samples for a date
#[derive(Debug, Clone, PartialEq)]
pub struct PricePage {
    /// Rows stored for the date, not just this page
    pub count: u64,
    pub samples: Vec<Sample>,
    /// True when this request fetched and stored the historical price
    pub backfilled: bool,
}

pub struct PriceQueryService {
    pipeline: Arc<PricePipeline>,
}

impl PriceQueryService {
    pub fn new(pipeline: Arc<PricePipeline>) -> Self {
        Self { pipeline }
    }

    /// Serve `limit` rows for `date` starting at `offset`.
    ///
    /// A date with no rows is backfilled first with the provider's historical
    /// price. The count is re-read afterwards because a concurrent cycle or
    /// request may have added rows for the same date.
    pub async fn page(
        &self,
        date: CalendarDate,
        limit: u32,
        offset: u64,
    ) -> Result<PricePage, PipelineError> {
        let store = self.pipeline.store();

        let mut count = store.count_by_date(date).await?;
        let backfilled = count == 0;
        if backfilled {
            info!("No samples stored for {}, fetching history", date);
            self.pipeline.record_historical(date).await?;
            count = store.count_by_date(date).await?;
        }

        let samples = store.query_by_date(date, limit, offset).await?;
        Ok(PricePage {
            count,
            samples,
            backfilled,
        })
    }
}
