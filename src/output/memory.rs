//! In-memory sink, for tests and library callers that post-process results

use crate::extract::ArticleRecord;
use crate::output::traits::{OutputResult, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects output in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    articles: Mutex<Vec<ArticleRecord>>,
    urls: Mutex<Vec<String>>,
    finished: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records written so far
    pub fn articles(&self) -> Vec<ArticleRecord> {
        lock(&self.articles).clone()
    }

    /// Snapshot of the URLs written so far
    pub fn urls(&self) -> Vec<String> {
        lock(&self.urls).clone()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Sink for MemorySink {
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()> {
        lock(&self.articles).push(record.clone());
        Ok(())
    }

    fn write_url(&self, url: &str) -> OutputResult<()> {
        lock(&self.urls).push(url.to_string());
        Ok(())
    }

    fn finish(&self) -> OutputResult<()> {
        self.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}
