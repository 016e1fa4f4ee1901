//! Configuration module for Headline-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use headline_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawl starts at: {}", config.crawler.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, OutputMode, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{apply_overrides, compute_config_hash, load_config, load_config_with_hash};

pub(crate) use validation::validate_article_pattern;
