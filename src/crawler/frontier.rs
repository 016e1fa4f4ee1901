//! Crawl frontier: visited set, pending queue, and depth ceiling
//!
//! One `Frontier` belongs to one crawl session. Workers share it behind an
//! `Arc`; the visited set and pending queue sit under a single lock so that
//! the visit check and the visit mark happen together.

use crate::url::{classify, Classification, SiteRules};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// What the engine does with a task once it is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Extract article records
    Article,
    /// Follow the page's links
    Navigable,
}

/// A unit of pending work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
    pub kind: TaskKind,
}

/// Result of offering a discovered URL to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Claimed and queued
    Queued(TaskKind),
    /// Claimed but not queued (article URL recorded without fetching)
    Claimed(TaskKind),
    /// Already visited in this session
    Duplicate,
    /// Rejected by the classifier
    Rejected(Classification),
    /// Navigable page beyond the depth ceiling
    TooDeep,
}

#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    pending: VecDeque<CrawlTask>,
}

/// Visited set plus pending work for one crawl session
#[derive(Debug)]
pub struct Frontier {
    rules: SiteRules,
    max_depth: Option<u32>,
    state: Mutex<FrontierState>,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `rules` - Site rules used to reject out-of-bounds URLs
    /// * `max_depth` - Navigation depth ceiling (`None` for unbounded)
    pub fn new(rules: SiteRules, max_depth: Option<u32>) -> Self {
        Self {
            rules,
            max_depth,
            state: Mutex::new(FrontierState::default()),
        }
    }

    pub fn rules(&self) -> &SiteRules {
        &self.rules
    }

    /// Returns true if the URL has not been visited and passes the classifier
    pub fn should_visit(&self, url: &Url) -> bool {
        classify(url, &self.rules).should_visit() && !self.lock().visited.contains(url.as_str())
    }

    /// Records a URL as visited; returns false if it already was
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// Returns true if a navigable page at `depth` may still be expanded
    pub fn within_depth(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// Checks and marks a URL in one step
    ///
    /// Exactly one caller wins for each URL, however many workers offer it
    /// concurrently.
    pub fn claim(&self, url: &Url) -> bool {
        if classify(url, &self.rules).is_rejected() {
            return false;
        }
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// Offers a discovered URL at `depth`
    ///
    /// Rejected, duplicate and too-deep URLs are dropped. With `fetch_articles`
    /// off, article URLs are claimed but not queued.
    pub fn admit(&self, url: Url, depth: u32, fetch_articles: bool) -> Admission {
        let kind = match classify(&url, &self.rules) {
            Classification::Article => TaskKind::Article,
            Classification::Navigable => TaskKind::Navigable,
            rejected @ Classification::Rejected(_) => return Admission::Rejected(rejected),
        };

        // Articles are leaves; only navigation is bounded by depth
        if kind == TaskKind::Navigable && !self.within_depth(depth) {
            return Admission::TooDeep;
        }

        let mut state = self.lock();
        if !state.visited.insert(url.as_str().to_string()) {
            return Admission::Duplicate;
        }

        if kind == TaskKind::Article && !fetch_articles {
            return Admission::Claimed(kind);
        }

        state.pending.push_back(CrawlTask { url, depth, kind });
        Admission::Queued(kind)
    }

    /// Takes the oldest pending task
    pub fn pop(&self) -> Option<CrawlTask> {
        self.lock().pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // The state stays consistent even if a holder panicked mid-insert
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
