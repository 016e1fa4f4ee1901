//! Crawl statistics
//!
//! Workers bump atomic counters as they go; the coordinator takes a
//! [`CrawlSummary`] snapshot when the run ends.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Why the crawl stopped pulling work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The frontier ran out of pending work
    #[default]
    Exhausted,
    /// `max-pages` fetches were dispatched
    PageBudget,
    /// `max-duration-secs` elapsed
    TimeBudget,
    /// The cancellation token fired
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exhausted => "frontier exhausted",
            Self::PageBudget => "page budget reached",
            Self::TimeBudget => "time budget reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_dispatched: AtomicU64,
    pub pages_fetched: AtomicU64,
    pub articles_fetched: AtomicU64,
    pub records_written: AtomicU64,
    pub urls_written: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub redirects: AtomicU64,
    pub links_rejected: AtomicU64,
    pub links_too_deep: AtomicU64,
    pub empty_extractions: AtomicU64,
    pub sink_errors: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments a counter by one
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot
    pub fn snapshot(&self) -> CrawlSummary {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        CrawlSummary {
            pages_dispatched: load(&self.pages_dispatched),
            pages_fetched: load(&self.pages_fetched),
            articles_fetched: load(&self.articles_fetched),
            records_written: load(&self.records_written),
            urls_written: load(&self.urls_written),
            fetch_failures: load(&self.fetch_failures),
            redirects: load(&self.redirects),
            links_rejected: load(&self.links_rejected),
            links_too_deep: load(&self.links_too_deep),
            empty_extractions: load(&self.empty_extractions),
            sink_errors: load(&self.sink_errors),
            ..CrawlSummary::default()
        }
    }
}

/// Summary of a finished crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub start_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_seconds: f64,
    pub stop_reason: StopReason,
    pub urls_visited: u64,
    pub config_hash: Option<String>,

    // Counters
    /// Requests handed to a worker
    pub pages_dispatched: u64,
    /// Requests answered with a 2xx page
    pub pages_fetched: u64,
    pub articles_fetched: u64,
    pub records_written: u64,
    pub urls_written: u64,
    pub fetch_failures: u64,
    /// 3xx answers whose target went back to the frontier
    pub redirects: u64,
    pub links_rejected: u64,
    pub links_too_deep: u64,
    pub empty_extractions: u64,
    pub sink_errors: u64,
}

impl CrawlSummary {
    /// Percentage of dispatched fetches that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.pages_dispatched == 0 {
            return 0.0;
        }
        let ok = self.pages_dispatched.saturating_sub(self.fetch_failures);
        (ok as f64 / self.pages_dispatched as f64) * 100.0
    }
}

/// Prints crawl statistics to stdout
pub fn print_statistics(summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");
    println!("Start URL: {}", summary.start_url);
    println!("Stopped: {}", summary.stop_reason);
    println!("Duration: {:.1}s\n", summary.duration_seconds);

    println!("URLs visited: {}", summary.urls_visited);
    println!("Requests dispatched: {}", summary.pages_dispatched);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Article pages: {}", summary.articles_fetched);
    println!("  Redirects: {}", summary.redirects);
    println!("  Fetch failures: {}", summary.fetch_failures);
    println!("  Success rate: {:.2}%", summary.success_rate());
    println!();

    println!("Records written: {}", summary.records_written);
    println!("URLs written: {}", summary.urls_written);
    println!("Articles without metadata: {}", summary.empty_extractions);
    if summary.sink_errors > 0 {
        println!("Sink errors: {}", summary.sink_errors);
    }
    println!();

    println!("Links rejected: {}", summary.links_rejected);
    println!("Links beyond max depth: {}", summary.links_too_deep);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reads_counters() {
        let stats = CrawlStats::new();
        CrawlStats::bump(&stats.pages_dispatched);
        CrawlStats::bump(&stats.pages_dispatched);
        CrawlStats::bump(&stats.pages_dispatched);
        CrawlStats::bump(&stats.pages_fetched);
        CrawlStats::bump(&stats.redirects);
        CrawlStats::bump(&stats.fetch_failures);
        CrawlStats::bump(&stats.records_written);

        let summary = stats.snapshot();
        assert_eq!(summary.pages_dispatched, 3);
        assert_eq!(summary.pages_fetched, 1);
        assert_eq!(summary.redirects, 1);
        assert_eq!(summary.fetch_failures, 1);
        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.links_rejected, 0);
        assert_eq!(summary.stop_reason, StopReason::Exhausted);
    }

    #[test]
    fn test_success_rate() {
        let summary = CrawlSummary {
            pages_dispatched: 80,
            pages_fetched: 60,
            fetch_failures: 20,
            ..CrawlSummary::default()
        };
        assert!((summary.success_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        assert_eq!(CrawlSummary::default().success_rate(), 0.0);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::PageBudget.to_string(), "page budget reached");
        assert_eq!(StopReason::Cancelled.to_string(), "cancelled");
    }
}
