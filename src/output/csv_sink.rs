//! Delimited text sink
//!
//! Writes history rows with the `csv` crate. Rows have different lengths
//! (searches carry four fields, visited results six), so the writer runs in
//! flexible mode. Every row is flushed as soon as it is written.

use crate::output::traits::{OutputError, OutputResult, RowSink};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Row sink writing delimited text to any writer
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Creates the sink and writes the header row
    ///
    /// # Arguments
    ///
    /// * `inner` - Destination writer
    /// * `delimiter` - Field separator byte
    /// * `header` - Column names, written as the first row
    pub fn new(inner: W, delimiter: u8, header: &[String]) -> OutputResult<Self> {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(inner);
        let mut sink = Self { writer };
        sink.write_row(header)?;
        Ok(sink)
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl CsvSink<File> {
    /// Creates (or truncates) a file and writes the header row
    pub fn create(path: &Path, delimiter: u8, header: &[String]) -> OutputResult<Self> {
        let file = File::create(path)?;
        Self::new(file, delimiter, header)
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row(&mut self, fields: &[String]) -> OutputResult<()> {
        self.writer.write_record(fields)?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
