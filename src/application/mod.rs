//! Application layer - use cases and services

pub mod commands;
pub mod ingestion;
pub mod pipeline;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{Cli, CommandExecutor, Commands};
pub use ingestion::{ConcurrencyPolicy, IngestionScheduler, SchedulerReport};
pub use pipeline::PricePipeline;
pub use query::{PricePage, PriceQueryService};
