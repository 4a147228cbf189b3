//! Line-oriented transport helpers
//!
//! The serial link carries newline-terminated text. `LineReader` frames any
//! byte source into lines for the collector and the monitor, and
//! `Transport` is the byte sink the generator writes samples to.

use crate::error::CaptureError;
use std::io::{self, BufRead, BufReader, Read, Write};

/// Buffered newline-delimited reader
pub struct LineReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
    lines_read: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            pending: Vec::new(),
            lines_read: 0,
        }
    }

    /// Number of complete lines returned so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Read the next line without its terminator
    ///
    /// Bytes received before a timeout are kept and prefixed to the next
    /// line. A final line without a trailing newline is still returned;
    /// the call after it reports the end of stream as `Disconnected`.
    pub fn read_line(&mut self) -> Result<String, CaptureError> {
        match self.inner.read_until(b'\n', &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Err(CaptureError::end_of_stream()),
            Ok(_) => Ok(self.take_line()),
            Err(e) => Err(CaptureError::from_transport(e)),
        }
    }

    fn take_line(&mut self) -> String {
        if self.pending.last() == Some(&b'\n') {
            self.pending.pop();
        }
        // Handle carriage returns
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }

        let line = String::from_utf8_lossy(&self.pending).to_string();
        self.pending.clear();
        self.lines_read += 1;
        line
    }
}

/// Byte sink the generator emits lines to
pub trait Transport: Write {
    /// Whether the link is ready to carry data
    fn is_ready(&mut self) -> bool {
        true
    }

    /// Write one line followed by `\r\n`, the way the board's println does
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.write_all(line.as_bytes())?;
        self.write_all(b"\r\n")?;
        self.flush()
    }
}

impl Transport for Vec<u8> {}

impl Transport for io::Stdout {}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_ready(&mut self) -> bool {
        (**self).is_ready()
    }
}
