//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier with the start URL
//! - Dispatching fetches to a bounded worker pool
//! - Extracting articles and expanding navigation pages
//! - Enforcing budgets and cancellation
//! - Producing the final run summary

use crate::config::{Config, OutputMode};
use crate::crawler::fetcher::{FetchResponse, Fetcher, HttpFetcher, RequestHeaders};
use crate::crawler::frontier::{Admission, CrawlTask, Frontier, TaskKind};
use crate::crawler::identity::{IdentityProvider, RotatingUserAgents};
use crate::crawler::parser::parse_html;
use crate::extract::extract_articles;
use crate::output::{open_sink, CrawlStats, CrawlSummary, Sink, StopReason};
use crate::url::{normalize_url, resolve_url, SiteRules};
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Run parameters resolved from the configuration
#[derive(Debug, Clone)]
struct CrawlSettings {
    start_url: Url,
    media_source: String,
    request_delay: Duration,
    request_timeout: Duration,
    max_concurrent: usize,
    max_pages: Option<u64>,
    max_duration: Option<Duration>,
    mode: OutputMode,
}

impl CrawlSettings {
    fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let crawler = &config.crawler;
        Ok(Self {
            start_url: normalize_url(&crawler.start_url)?,
            media_source: config.site.media_source.clone(),
            request_delay: Duration::from_millis(crawler.request_delay_ms),
            request_timeout: Duration::from_secs(crawler.request_timeout_secs),
            max_concurrent: crawler.max_concurrent_requests.max(1) as usize,
            max_pages: crawler.max_pages,
            max_duration: crawler.max_duration_secs.map(Duration::from_secs),
            mode: config.output.mode,
        })
    }

    fn fetch_articles(&self) -> bool {
        self.mode == OutputMode::Articles
    }
}

/// State shared by every worker task
struct CrawlShared {
    settings: CrawlSettings,
    frontier: Frontier,
    fetcher: Arc<dyn Fetcher>,
    identity: Arc<dyn IdentityProvider>,
    sink: Arc<dyn Sink>,
    stats: CrawlStats,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    shared: CrawlShared,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP fetcher and opens the configured output sink.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to initialize
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let fetcher = Arc::new(HttpFetcher::with_timeout(timeout)?);
        let sink = open_sink(&config.output)?;
        Self::with_parts(config, fetcher, sink)
    }

    /// Creates a coordinator around a caller-supplied fetcher and sink
    pub fn with_parts(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self, HarvestError> {
        let settings = CrawlSettings::from_config(config)?;
        let rules = SiteRules::from_config(config)?;
        let identity = Arc::new(RotatingUserAgents::new(config.user_agent.pool.clone()));

        Ok(Self {
            shared: CrawlShared {
                settings,
                frontier: Frontier::new(rules, config.crawler.max_depth),
                fetcher,
                identity,
                sink,
                stats: CrawlStats::new(),
            },
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the identity provider
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.shared.identity = identity;
        self
    }

    /// Token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Seeds the frontier with the start URL
    /// 2. Pops tasks and dispatches them to workers, one delay apart
    /// 3. Stops pulling work once a budget runs out or the token is cancelled
    /// 4. Waits for in-flight fetches to drain
    /// 5. Finishes the sink and returns the run summary
    pub async fn run(self) -> Result<CrawlSummary, HarvestError> {
        let Coordinator { shared, cancel } = self;
        let shared = Arc::new(shared);
        let settings = &shared.settings;
        let started_at = Utc::now();
        let start_time = Instant::now();
        let deadline = settings.max_duration.map(|d| start_time + d);

        tracing::info!("Starting crawl at {}", settings.start_url);

        let seed = settings.start_url.clone();
        let admission = shared
            .frontier
            .admit(seed.clone(), 0, settings.fetch_articles());
        record_admission(&shared, &seed, admission);

        let mut workers: JoinSet<()> = JoinSet::new();
        let mut dispatched: u64 = 0;
        let mut stop_reason: Option<StopReason> = None;

        loop {
            if stop_reason.is_none() {
                stop_reason = budget_stop(settings, &cancel, dispatched, start_time.elapsed());
                if let Some(reason) = stop_reason {
                    tracing::info!(
                        "Stopping crawl ({}), waiting for {} in-flight fetches",
                        reason,
                        workers.len()
                    );
                }
            }

            if stop_reason.is_none() && workers.len() < settings.max_concurrent {
                if let Some(task) = shared.frontier.pop() {
                    if dispatched > 0 && !settings.request_delay.is_zero() {
                        tokio::select! {
                            _ = tokio::time::sleep(settings.request_delay) => {}
                            _ = cancel.cancelled() => {
                                tracing::debug!("Cancelled before dispatching {}", task.url);
                                continue;
                            }
                        }
                    }

                    tracing::debug!("Dispatching {} (depth {})", task.url, task.depth);
                    workers.spawn(process_task(Arc::clone(&shared), task));
                    CrawlStats::bump(&shared.stats.pages_dispatched);
                    dispatched += 1;

                    // Progress reporting every 10 pages
                    if dispatched % 10 == 0 {
                        let rate = dispatched as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages dispatched, {} pending, {:.2} pages/sec",
                            dispatched,
                            shared.frontier.pending_len(),
                            rate
                        );
                    }
                    continue;
                }
            }

            if workers.is_empty() {
                break;
            }

            tokio::select! {
                joined = workers.join_next() => {
                    if let Some(Err(e)) = joined {
                        tracing::error!("Worker task failed: {}", e);
                    }
                }
                _ = cancel.cancelled(), if stop_reason.is_none() => {}
                _ = sleep_until_deadline(deadline), if stop_reason.is_none() => {}
            }
        }

        if let Err(e) = shared.sink.finish() {
            tracing::error!("Failed to finish output: {}", e);
            CrawlStats::bump(&shared.stats.sink_errors);
        }

        let finished_at = Utc::now();
        let mut summary = shared.stats.snapshot();
        summary.start_url = settings.start_url.to_string();
        summary.started_at = started_at.to_rfc3339();
        summary.finished_at = finished_at.to_rfc3339();
        summary.duration_seconds = start_time.elapsed().as_secs_f64();
        summary.stop_reason = stop_reason.unwrap_or_default();
        summary.urls_visited = shared.frontier.visited_len() as u64;

        tracing::info!(
            "Crawl completed: {} requests, {} pages fetched, {} records written in {:?} ({})",
            summary.pages_dispatched,
            summary.pages_fetched,
            summary.records_written,
            start_time.elapsed(),
            summary.stop_reason
        );

        Ok(summary)
    }
}

/// Returns why the crawl must stop pulling work, if it must
fn budget_stop(
    settings: &CrawlSettings,
    cancel: &CancellationToken,
    dispatched: u64,
    elapsed: Duration,
) -> Option<StopReason> {
    if cancel.is_cancelled() {
        Some(StopReason::Cancelled)
    } else if settings.max_pages.is_some_and(|max| dispatched >= max) {
        Some(StopReason::PageBudget)
    } else if settings.max_duration.is_some_and(|max| elapsed >= max) {
        Some(StopReason::TimeBudget)
    } else {
        None
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Fetches one task and hands the page to the extractor or the link expander
async fn process_task(shared: Arc<CrawlShared>, task: CrawlTask) {
    let stats = &shared.stats;
    let response = match fetch_page(&shared, &task.url).await {
        Some(response) => response,
        None => {
            CrawlStats::bump(&stats.fetch_failures);
            return;
        }
    };

    if response.is_redirect() {
        follow_redirect(&shared, &task, &response);
        return;
    }

    CrawlStats::bump(&stats.pages_fetched);
    match task.kind {
        TaskKind::Article => {
            CrawlStats::bump(&stats.articles_fetched);
            write_articles(&shared, &task.url, &response.body);
        }
        TaskKind::Navigable => expand_links(&shared, &task, &response),
    }
}

/// Sends a redirect target back through the frontier at the task's depth
///
/// The target is classified like any discovered link, so a redirect into a
/// blacklisted section or onto another host is never fetched.
fn follow_redirect(shared: &CrawlShared, task: &CrawlTask, response: &FetchResponse) {
    let location = response.location.as_deref().unwrap_or_default();
    let target = match resolve_url(location, &task.url) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Unusable redirect from {} to {:?}: {}", task.url, location, e);
            CrawlStats::bump(&shared.stats.fetch_failures);
            return;
        }
    };

    CrawlStats::bump(&shared.stats.redirects);
    tracing::debug!(
        "{} redirects ({}) to {}",
        task.url,
        response.status_code,
        target
    );
    let admission = shared
        .frontier
        .admit(target.clone(), task.depth, shared.settings.fetch_articles());
    record_admission(shared, &target, admission);
}

/// Issues the request; failures are logged and yield `None`
async fn fetch_page(shared: &CrawlShared, url: &Url) -> Option<FetchResponse> {
    let mut headers = RequestHeaders::new();
    headers.insert("User-Agent".to_string(), shared.identity.user_agent());

    let timeout = shared.settings.request_timeout;
    match tokio::time::timeout(timeout, shared.fetcher.fetch(url, &headers)).await {
        Ok(Ok(response)) if response.is_success() || response.is_redirect() => Some(response),
        Ok(Ok(response)) => {
            tracing::warn!("HTTP {} for {}", response.status_code, url);
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("{}", e);
            None
        }
        Err(_) => {
            tracing::warn!("Request timeout for {} after {:?}", url, timeout);
            None
        }
    }
}

fn write_articles(shared: &CrawlShared, url: &Url, html: &str) {
    let records = extract_articles(
        url,
        html,
        &shared.settings.media_source,
        shared.frontier.rules(),
    );

    if records.is_empty() {
        tracing::debug!("No article metadata found on {}", url);
        CrawlStats::bump(&shared.stats.empty_extractions);
        return;
    }

    for record in &records {
        match shared.sink.write_article(record) {
            Ok(()) => CrawlStats::bump(&shared.stats.records_written),
            Err(e) => {
                tracing::error!("Failed to write record for {}: {}", url, e);
                CrawlStats::bump(&shared.stats.sink_errors);
            }
        }
    }
}

fn expand_links(shared: &CrawlShared, task: &CrawlTask, response: &FetchResponse) {
    // Relative links resolve against the URL that served the page
    let base = Url::parse(&response.final_url).unwrap_or_else(|_| task.url.clone());
    let parsed = parse_html(&response.body, &base);
    let total = parsed.links.len();
    let parsed_title = parsed.title;
    let mut queued = 0;

    for link in parsed.links {
        let admission = shared.frontier.admit(
            link.clone(),
            task.depth + 1,
            shared.settings.fetch_articles(),
        );
        if matches!(admission, Admission::Queued(_)) {
            queued += 1;
        }
        record_admission(shared, &link, admission);
    }

    tracing::debug!(
        "Expanded {} ({}): {} links, {} queued",
        task.url,
        parsed_title.as_deref().unwrap_or("untitled"),
        total,
        queued
    );
}

/// Updates counters and URL-only output for one admission decision
fn record_admission(shared: &CrawlShared, url: &Url, admission: Admission) {
    match admission {
        Admission::Queued(_) | Admission::Duplicate => {}
        Admission::Claimed(_) => match shared.sink.write_url(url.as_str()) {
            Ok(()) => CrawlStats::bump(&shared.stats.urls_written),
            Err(e) => {
                tracing::error!("Failed to write URL {}: {}", url, e);
                CrawlStats::bump(&shared.stats.sink_errors);
            }
        },
        Admission::Rejected(classification) => {
            tracing::trace!("Rejected {}: {:?}", url, classification);
            CrawlStats::bump(&shared.stats.links_rejected);
        }
        Admission::TooDeep => {
            tracing::trace!("Beyond max depth: {}", url);
            CrawlStats::bump(&shared.stats.links_too_deep);
        }
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the HTTP fetcher and open the output sink
/// 2. Seed the frontier with the start URL
/// 3. Drain the frontier with a bounded worker pool
/// 4. Finish the sink and return the run summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(HarvestError)` - Crawl could not start
///
/// # Example
///
/// ```no_run
/// use headline_harvest::config::load_config;
/// use headline_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(&config).await?;
/// println!("{} records", summary.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlSummary, HarvestError> {
    Coordinator::new(config)?.run().await
}
