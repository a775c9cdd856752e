//! Error handling for the application

use thiserror::Error;

/// Price feed errors
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// Transport failure or non-2xx response
    #[error("Price feed unavailable: {0}")]
    Unavailable(String),

    /// Body did not carry a numeric price at `market_data.current_price.<currency>`
    #[error("Invalid price data: {0}")]
    Parse(String),
}

/// Sample store errors
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Failed to write sample: {0}")]
    Write(String),

    #[error("Failed to read samples: {0}")]
    Read(String),
}

/// Rejected request parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unable to parse date")]
    Date(String),

    #[error("Unable to parse limit")]
    Limit(String),

    #[error("Unable to parse offset")]
    Offset(String),
}

/// Notification errors
#[derive(Error, Debug, Clone)]
pub enum NotifyError {
    #[error("Notification outbox closed")]
    Closed,
}

/// Errors while recording a price, scheduled or on demand
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Feed error: {0}")]
    FeedError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        AppError::FeedError(err.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Feed(e) => e.into(),
            PipelineError::Store(e) => e.into(),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Open(err.to_string())
    }
}
