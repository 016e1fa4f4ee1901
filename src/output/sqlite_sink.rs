//! SQLite sink
//!
//! Records go to an `articles` table, URL-only output to `article_urls`.
//! Keywords are stored as a JSON array.

use crate::extract::ArticleRecord;
use crate::output::traits::{OutputResult, Sink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQL schema for the output database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    keywords TEXT NOT NULL,
    date TEXT NOT NULL,
    media_source TEXT NOT NULL,
    article_id TEXT NOT NULL,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(url);
CREATE INDEX IF NOT EXISTS idx_articles_article_id ON articles(article_id);

CREATE TABLE IF NOT EXISTS article_urls (
    url TEXT PRIMARY KEY,
    discovered_at TEXT NOT NULL
);
"#;

/// SQLite-backed sink
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens (or creates) the database and initializes the schema
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        Self::from_connection(conn)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> OutputResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored article records
    pub fn count_articles(&self) -> OutputResult<u64> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of stored article URLs
    pub fn count_urls(&self) -> OutputResult<u64> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM article_urls", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Sink for SqliteSink {
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()> {
        let keywords = serde_json::to_string(&record.keywords)?;
        self.lock().execute(
            "INSERT INTO articles (url, title, content, keywords, date, media_source, article_id, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.url,
                record.title,
                record.content,
                keywords,
                record.date,
                record.media_source,
                record.article_id,
                record.scraped_at,
            ],
        )?;
        Ok(())
    }

    fn write_url(&self, url: &str) -> OutputResult<()> {
        self.lock().execute(
            "INSERT OR IGNORE INTO article_urls (url, discovered_at) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn finish(&self) -> OutputResult<()> {
        // Fold the WAL back into the main file so the output is self-contained
        self.lock()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record() -> ArticleRecord {
        ArticleRecord {
            url: "https://www.example.com/a-123456789012_1.html".to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            keywords: vec!["x".to_string(), "y".to_string()],
            date: "2025-02-07".to_string(),
            media_source: "Example News".to_string(),
            article_id: "123456789012".to_string(),
            scraped_at: "2025-02-07 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_write_article() {
        let sink = SqliteSink::open_in_memory().unwrap();
        sink.write_article(&record()).unwrap();
        sink.write_article(&record()).unwrap();
        assert_eq!(sink.count_articles().unwrap(), 2);

        let keywords: String = sink
            .lock()
            .query_row("SELECT keywords FROM articles LIMIT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(keywords, r#"["x","y"]"#);
    }

    #[test]
    fn test_write_url_is_unique() {
        let sink = SqliteSink::open_in_memory().unwrap();
        sink.write_url("https://www.example.com/a-123456789012_1.html")
            .unwrap();
        sink.write_url("https://www.example.com/a-123456789012_1.html")
            .unwrap();
        assert_eq!(sink.count_urls().unwrap(), 1);
    }

    #[test]
    fn test_file_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.db");

        let sink = SqliteSink::open(&path).unwrap();
        sink.write_article(&record()).unwrap();
        sink.finish().unwrap();
        drop(sink);

        let reopened = SqliteSink::open(&path).unwrap();
        assert_eq!(reopened.count_articles().unwrap(), 1);
    }
}
