//! Sink trait and output errors
//!
//! A sink receives either article records or bare article URLs, depending on
//! the output mode. Implementations must be thread-safe: workers write to the
//! same sink concurrently, in no particular order.

use crate::extract::ArticleRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for crawl output
pub trait Sink: Send + Sync {
    /// Persists one extracted article record
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()>;

    /// Persists one discovered article URL (URL-only mode)
    fn write_url(&self, url: &str) -> OutputResult<()>;

    /// Flushes buffered output; called once when the crawl ends
    fn finish(&self) -> OutputResult<()>;
}
