//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing and link extraction
//! - The frontier of pending and visited URLs
//! - User-Agent rotation
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod identity;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher, RequestHeaders,
};
pub use frontier::{Admission, CrawlTask, Frontier, TaskKind};
pub use identity::{IdentityProvider, RotatingUserAgents, DEFAULT_USER_AGENTS};
pub use parser::{parse_html, ParsedPage};
