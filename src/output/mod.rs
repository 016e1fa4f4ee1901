//! Output module for crawl results and reports
//!
//! This module handles:
//! - Writing article records or article URLs to a sink
//! - Generating markdown summaries of crawl runs
//! - Recording crawl statistics

mod csv_sink;
mod jsonl;
mod markdown;
mod memory;
mod sqlite_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use jsonl::{JsonArraySink, JsonLinesSink};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use memory::MemorySink;
pub use sqlite_sink::SqliteSink;
pub use stats::{print_statistics, CrawlStats, CrawlSummary, StopReason};
pub use traits::{OutputError, OutputResult, Sink};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;
use std::sync::Arc;

/// Opens the sink described by the output configuration
///
/// # Arguments
///
/// * `output` - The `[output]` section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Sink>)` - A sink ready to accept writes
/// * `Err(OutputError)` - The destination could not be created
pub fn open_sink(output: &OutputConfig) -> OutputResult<Arc<dyn Sink>> {
    let path = Path::new(&output.path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let sink: Arc<dyn Sink> = match output.format {
        OutputFormat::Jsonl => Arc::new(JsonLinesSink::create(path)?),
        OutputFormat::Json => Arc::new(JsonArraySink::create(path)?),
        OutputFormat::Csv => Arc::new(CsvSink::create(path, output.mode)?),
        OutputFormat::Sqlite => Arc::new(SqliteSink::open(path)?),
    };

    tracing::debug!(path = %output.path, format = ?output.format, "Opened output sink");
    Ok(sink)
}
