//! Browser identity rotation
//!
//! Each request carries a User-Agent drawn from a pool of common desktop
//! browser strings, cycling round-robin across requests.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Built-in pool used when the configuration supplies none
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Supplies a plausible browser identity per request
pub trait IdentityProvider: Send + Sync {
    fn user_agent(&self) -> String;
}

/// Round-robin over a fixed pool of User-Agent strings
#[derive(Debug)]
pub struct RotatingUserAgents {
    pool: Vec<String>,
    next: AtomicUsize,
}

impl RotatingUserAgents {
    /// Creates a rotator; an empty pool falls back to [`DEFAULT_USER_AGENTS`]
    pub fn new(pool: Vec<String>) -> Self {
        let pool = if pool.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            pool
        };

        Self {
            pool,
            next: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Default for RotatingUserAgents {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl IdentityProvider for RotatingUserAgents {
    fn user_agent(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        self.pool[index].clone()
    }
}
