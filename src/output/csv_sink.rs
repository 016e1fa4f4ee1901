//! CSV sink
//!
//! The header row is written up front so an empty crawl still produces a
//! well-formed file. Keywords are joined into a single column.

use crate::config::OutputMode;
use crate::extract::ArticleRecord;
use crate::output::traits::{OutputResult, Sink};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const ARTICLE_HEADERS: &[&str] = &[
    "url",
    "title",
    "content",
    "keywords",
    "date",
    "media_source",
    "article_id",
    "scraped_at",
];

#[derive(Serialize)]
struct ArticleRow<'a> {
    url: &'a str,
    title: &'a str,
    content: &'a str,
    keywords: String,
    date: &'a str,
    media_source: &'a str,
    article_id: &'a str,
    scraped_at: &'a str,
}

impl<'a> From<&'a ArticleRecord> for ArticleRow<'a> {
    fn from(record: &'a ArticleRecord) -> Self {
        Self {
            url: &record.url,
            title: &record.title,
            content: &record.content,
            keywords: record.keywords_joined(),
            date: &record.date,
            media_source: &record.media_source,
            article_id: &record.article_id,
            scraped_at: &record.scraped_at,
        }
    }
}

/// Comma-separated output
pub struct CsvSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    /// Creates (or truncates) the output file and writes the header row
    pub fn create(path: &Path, mode: OutputMode) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        match mode {
            OutputMode::Articles => writer.write_record(ARTICLE_HEADERS)?,
            OutputMode::Urls => writer.write_record(["url"])?,
        }

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    fn lock(&self) -> MutexGuard<'_, csv::Writer<File>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for CsvSink {
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()> {
        self.lock().serialize(ArticleRow::from(record))?;
        Ok(())
    }

    fn write_url(&self, url: &str) -> OutputResult<()> {
        self.lock().write_record([url])?;
        Ok(())
    }

    fn finish(&self) -> OutputResult<()> {
        self.lock().flush()?;
        Ok(())
    }
}
