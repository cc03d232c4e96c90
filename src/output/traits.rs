//! Output sink and progress traits
//!
//! This module defines the interfaces the crawl driver writes to: a row sink
//! receiving one ordered field list per history line, and a progress observer
//! notified after each page transition.

use crate::history::ActivityDate;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for row sinks
///
/// A sink is a streaming collaborator: each row must be durable (or at least
/// handed to the underlying writer) before the next one is produced. The
/// header row is written by the sink itself when it is created.
pub trait RowSink {
    /// Writes one row
    ///
    /// # Arguments
    ///
    /// * `fields` - The row's fields, in column order
    fn write_row(&mut self, fields: &[String]) -> OutputResult<()>;

    /// Flushes any buffered rows to the underlying writer
    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write_row(&mut self, fields: &[String]) -> OutputResult<()> {
        (**self).write_row(fields)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}

/// Sink that keeps every row in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub rows: Vec<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the sink with a header row, like the file sinks do
    pub fn with_header(header: &[String]) -> Self {
        Self {
            rows: vec![header.to_vec()],
        }
    }
}

impl RowSink for MemorySink {
    fn write_row(&mut self, fields: &[String]) -> OutputResult<()> {
        self.rows.push(fields.to_vec());
        Ok(())
    }
}

/// Snapshot of crawl progress after a page has been drained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Listing pages parsed so far
    pub pages: usize,

    /// Searches exported so far
    pub searches: usize,

    /// Date of the most recently exported search
    pub last_search_date: Option<ActivityDate>,
}

/// Observer notified as the crawl advances
pub trait ProgressObserver {
    /// Called before following the link to the next (older) page
    fn on_page(&mut self, progress: &Progress);
}

/// Observer that reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_page(&mut self, progress: &Progress) {
        match progress.last_search_date {
            Some(date) => tracing::info!(
                "Progress: {} searches over {} pages, last search on {}",
                progress.searches,
                progress.pages,
                date
            ),
            None => tracing::info!(
                "Progress: {} searches over {} pages",
                progress.searches,
                progress.pages
            ),
        }
    }
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn on_page(&mut self, progress: &Progress) {
        self(progress)
    }
}
