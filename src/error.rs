//! Session error taxonomy
//!
//! Every variant is terminal for the session that raised it, except
//! `MalformedRow`, which the collector may skip depending on its policy.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Serial port {port} is unavailable")]
    TransportUnavailable {
        port: String,
        #[source]
        source: io::Error,
    },
    #[error("Timed out waiting for data on the transport")]
    ReadTimeout,
    #[error("Transport disconnected")]
    Disconnected(#[source] io::Error),
    #[error("Malformed row, expected {expected} fields but found {found}: {line:?}")]
    MalformedRow {
        expected: usize,
        found: usize,
        line: String,
    },
    #[error("Failed to write {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl CaptureError {
    /// End of stream, reported the same way as a dropped connection
    pub fn end_of_stream() -> Self {
        CaptureError::Disconnected(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "transport closed",
        ))
    }

    /// Classify an I/O error raised while reading or writing the transport
    pub fn from_transport(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => CaptureError::ReadTimeout,
            _ => CaptureError::Disconnected(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err = CaptureError::from_transport(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(matches!(err, CaptureError::ReadTimeout));

        let err = CaptureError::from_transport(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(err, CaptureError::Disconnected(_)));
    }

    #[test]
    fn test_malformed_row_message() {
        let err = CaptureError::MalformedRow {
            expected: 2,
            found: 3,
            line: "1 2 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed row, expected 2 fields but found 3: \"1 2 3\""
        );
    }
}
