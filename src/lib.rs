//! Pricewatch - periodic asset price sampler with a paginated history API
//! Built with Domain-Driven Design principles

pub mod api;
pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{IngestionScheduler, PricePipeline, PriceQueryService};
pub use domain::alert::AlertEvaluator;
pub use domain::sample::{Sample, SampleRepository};
pub use infrastructure::storage::SqliteSampleStore;
pub use shared::config::Config;
