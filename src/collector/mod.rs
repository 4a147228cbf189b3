//! Serial-to-CSV collector
//!
//! A session reads one header line, then data lines until the requested
//! number of rows has been accepted. Rows accumulate in a `Dataset` that is
//! saved once the session completes. Any transport failure ends the session
//! and the partial dataset is dropped.

pub mod dataset;
pub mod parse;
pub mod progress;

pub use dataset::{resolve_output_path, Dataset};
pub use parse::{parse_header, parse_line, Reading, Value};
pub use progress::{ProgressMode, SessionProgress};

use crate::error::CaptureError;
use crate::transport::LineReader;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// What to do with a data line whose width does not match the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log and drop the line; it does not count toward the sample total
    #[default]
    Skip,
    /// End the session with `MalformedRow`
    Abort,
}

/// Per-session parsing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    /// The board prints a header line before any data
    pub headers_printed: bool,
    pub malformed: MalformedPolicy,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            headers_printed: true,
            malformed: MalformedPolicy::Skip,
        }
    }
}

/// Counters kept across a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub accepted: usize,
    pub skipped: usize,
    /// Empty lines and lines made only of separators such as `,`
    pub blank: usize,
}

/// Reads a fixed number of rows from a line source
pub struct Collector<R> {
    reader: LineReader<R>,
    settings: CollectorSettings,
    stats: SessionStats,
}

impl<R: Read> Collector<R> {
    pub fn new(source: R, settings: CollectorSettings) -> Self {
        Self {
            reader: LineReader::new(source),
            settings,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Capture `num_of_samples` rows into a new dataset
    pub fn read_session(
        &mut self,
        num_of_samples: usize,
        progress: &SessionProgress,
    ) -> Result<Dataset, CaptureError> {
        self.stats = SessionStats::default();

        let first = self.next_content_line()?;
        let mut dataset = if self.settings.headers_printed {
            let columns = parse_header(&first);
            log::debug!("Header columns: {:?}", columns);
            Dataset::new(columns)
        } else {
            let columns = parse::default_headers(parse::split_fields(&first).len());
            log::debug!("No header printed, using generated columns {:?}", columns);
            let mut dataset = Dataset::new(columns);
            if num_of_samples > 0 {
                self.accept(&mut dataset, &first, progress)?;
            }
            dataset
        };
        progress.header(dataset.columns());

        while dataset.len() < num_of_samples {
            let line = self.next_content_line()?;
            self.accept(&mut dataset, &line, progress)?;
        }

        log::debug!(
            "Session complete: {} rows, {} skipped, {} blank lines",
            self.stats.accepted,
            self.stats.skipped,
            self.stats.blank
        );
        Ok(dataset)
    }

    fn accept(
        &mut self,
        dataset: &mut Dataset,
        line: &str,
        progress: &SessionProgress,
    ) -> Result<(), CaptureError> {
        let result = parse_line(line, dataset.columns()).and_then(|reading| dataset.push(reading));

        match result {
            Ok(()) => {
                self.stats.accepted += 1;
                if let Some(reading) = dataset.rows().last() {
                    progress.row(reading);
                }
                Ok(())
            }
            Err(err @ CaptureError::MalformedRow { .. })
                if self.settings.malformed == MalformedPolicy::Skip =>
            {
                self.stats.skipped += 1;
                let line_number = self.reader.lines_read();
                progress.suspend(|| log::warn!("Skipping line {}: {}", line_number, err));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Next line with at least one field; lines of only separators count as blank
    fn next_content_line(&mut self) -> Result<String, CaptureError> {
        loop {
            let line = self.reader.read_line()?;
            if parse::split_fields(&line).is_empty() {
                self.stats.blank += 1;
                continue;
            }
            return Ok(line);
        }
    }
}

#[cfg(feature = "serial")]
impl Collector<crate::serial::SerialConnection> {
    /// Open a serial port and prepare a collector on it
    ///
    /// Bytes queued before the port was opened are discarded.
    pub fn open(
        config: crate::serial::PortConfig,
        settings: CollectorSettings,
    ) -> Result<Self, CaptureError> {
        let mut connection = crate::serial::SerialConnection::open(config)?;
        if let Err(e) = connection.clear_buffers() {
            log::debug!("{:#}", e);
        }
        Ok(Self::new(connection, settings))
    }
}
