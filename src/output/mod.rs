//! Output module for exported history rows
//!
//! This module handles:
//! - Streaming rows to a delimited text sink
//! - Reporting crawl progress to an observer

mod csv_sink;
mod traits;

pub use csv_sink::CsvSink;
pub use traits::{
    LogProgress, MemorySink, OutputError, OutputResult, Progress, ProgressObserver, RowSink,
};

use crate::config::Config;
use std::io::{self, Write};

/// Opens the sink named by the output configuration
///
/// Writes to the configured file, or to stdout when no path is set. The
/// header row is written immediately.
pub fn open_sink(config: &Config) -> OutputResult<Box<dyn RowSink>> {
    let labels = config.labels();
    let header = &labels.columns;
    let delimiter = config.output.delimiter_byte();

    match &config.output.path {
        Some(path) => {
            tracing::info!("Writing history to {}", path.display());
            Ok(Box::new(CsvSink::create(path, delimiter, header)?))
        }
        None => {
            let stdout: Box<dyn Write> = Box::new(io::stdout());
            Ok(Box::new(CsvSink::new(stdout, delimiter, header)?))
        }
    }
}
