//! JSONL Logger
//!
//! Append-only JSON-lines writer shared by the task event stream and the cache
//! diagnostics sink.

use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one serialized record per line
#[derive(Debug)]
pub struct JsonlLogger {
    writer: Option<BufWriter<File>>,
    record_count: u64,
}

impl JsonlLogger {
    /// Create a new logger writing to the specified path, creating missing
    /// parent directories
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
        })
    }

    /// Create a logger that discards records (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
        }
    }

    /// Number of records logged so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Log a record as one line
    pub fn log<T: Serialize>(&mut self, record: &T) -> std::io::Result<()> {
        self.record_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for JsonlLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush JSONL logger: {}", e);
        }
    }
}
