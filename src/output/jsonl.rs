//! JSON sinks
//!
//! `JsonLinesSink` appends one JSON object per line as records arrive.
//! `JsonArraySink` buffers everything and writes a single array on finish.

use crate::extract::ArticleRecord;
use crate::output::traits::{OutputResult, Sink};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Newline-delimited JSON output
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Creates (or truncates) the output file
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, value: &impl serde::Serialize) -> OutputResult<()> {
        let line = serde_json::to_string(value)?;
        let mut writer = lock(&self.writer);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Sink for JsonLinesSink {
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()> {
        self.write_line(record)
    }

    fn write_url(&self, url: &str) -> OutputResult<()> {
        self.write_line(&json!({ "url": url }))
    }

    fn finish(&self) -> OutputResult<()> {
        lock(&self.writer).flush()?;
        Ok(())
    }
}

/// Single JSON array output, written when the crawl finishes
pub struct JsonArraySink {
    file: Mutex<Option<File>>,
    items: Mutex<Vec<Value>>,
}

impl JsonArraySink {
    /// Creates (or truncates) the output file
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: Mutex::new(Some(file)),
            items: Mutex::new(Vec::new()),
        })
    }
}

impl Sink for JsonArraySink {
    fn write_article(&self, record: &ArticleRecord) -> OutputResult<()> {
        let value = serde_json::to_value(record)?;
        lock(&self.items).push(value);
        Ok(())
    }

    fn write_url(&self, url: &str) -> OutputResult<()> {
        lock(&self.items).push(json!({ "url": url }));
        Ok(())
    }

    fn finish(&self) -> OutputResult<()> {
        // A second finish has nothing left to write
        let Some(file) = lock(&self.file).take() else {
            return Ok(());
        };

        let items = std::mem::take(&mut *lock(&self.items));
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &items)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
