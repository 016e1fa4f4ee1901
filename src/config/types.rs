use serde::Deserialize;

/// Main configuration structure for Headline-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// The only host whose pages are visited (matched exactly)
    #[serde(rename = "allowed-domain")]
    pub allowed_domain: String,

    /// Maximum navigation depth from the start URL (unbounded when absent)
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Fixed delay between fetch dispatches (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Stop dispatching after this many fetches
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u64>,

    /// Stop dispatching after this many seconds
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: Option<u64>,
}

/// Site-specific classification and extraction rules
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Publisher name stamped on every record
    #[serde(rename = "media-source")]
    pub media_source: String,

    /// Substrings that exclude a URL wherever they occur
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Regex matched against the URL path; its first capture group is the article id
    #[serde(rename = "article-pattern", default)]
    pub article_pattern: Option<String>,
}

/// Browser identities rotated across requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent strings; the built-in pool is used when empty
    #[serde(default)]
    pub pool: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Destination file for records or URLs
    pub path: String,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub mode: OutputMode,

    /// Optional path for a markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// Serialization format of the output sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Csv,
    Sqlite,
}

/// What the crawl writes to the sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Fetch article pages and write extracted records
    #[default]
    Articles,
    /// Write article URLs without fetching them
    Urls,
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_max_concurrent_requests() -> u32 {
    4
}
