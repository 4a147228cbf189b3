//! In-memory table of readings and its CSV form

use super::parse::{Reading, Value};
use crate::error::CaptureError;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ordered readings captured in one session
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Reading>,
}

impl Dataset {
    /// Create an empty dataset with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a reading, rejecting one whose width differs from the header
    pub fn push(&mut self, reading: Reading) -> Result<(), CaptureError> {
        if reading.len() != self.columns.len() {
            return Err(CaptureError::MalformedRow {
                expected: self.columns.len(),
                found: reading.len(),
                line: reading
                    .values
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }
        self.rows.push(reading);
        Ok(())
    }

    /// Write header and rows as CSV to any writer
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(host_terminator())
            .from_writer(writer);

        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row.values.iter().map(Value::to_string))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Save to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        let file_write = |source| CaptureError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        let file = std::fs::File::create(path).map_err(|e| file_write(csv::Error::from(e)))?;
        self.write_csv(file).map_err(file_write)?;

        log::info!("Saved {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Render the first `n` rows as an aligned text table
    pub fn preview(&self, n: usize) -> String {
        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(n)
            .map(|row| row.values.iter().map(Value::to_string).collect())
            .collect();

        let index_width = shown.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                shown
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(String::len)
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let _ = write!(out, "{:>w$}", "", w = index_width);
        for (name, width) in self.columns.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", name, w = *width);
        }
        out.push('\n');

        for (idx, row) in shown.iter().enumerate() {
            let _ = write!(out, "{:>w$}", idx, w = index_width);
            for (value, width) in row.iter().zip(&widths) {
                let _ = write!(out, "  {:>w$}", value, w = *width);
            }
            out.push('\n');
        }

        if self.rows.len() > n {
            let _ = writeln!(out, "... {} more rows", self.rows.len() - n);
        }
        out
    }
}

#[cfg(windows)]
fn host_terminator() -> csv::Terminator {
    csv::Terminator::CRLF
}

#[cfg(not(windows))]
fn host_terminator() -> csv::Terminator {
    csv::Terminator::Any(b'\n')
}

/// Pick the path a session result is written to
///
/// A name without an extension gets `.csv`. Unless `overwrite` is set, an
/// existing file is kept and ` (1)`, ` (2)`, ... is appended to the stem.
pub fn resolve_output_path(path: &Path, overwrite: bool) -> PathBuf {
    let path = if path.extension().is_none() {
        path.with_extension("csv")
    } else {
        path.to_path_buf()
    };

    if overwrite || !path.exists() {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut count = 1;
    loop {
        let candidate = path.with_file_name(format!("{} ({}).{}", stem, count, ext));
        if !candidate.exists() {
            log::debug!("{} exists, using {}", path.display(), candidate.display());
            return candidate;
        }
        count += 1;
    }
}
