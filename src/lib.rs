//! Serial sample generator and CSV collector
//!
//! A generator writes a header line followed by one `<integer> <float>`
//! line per interval. The collector reads such a stream from a serial port,
//! parses it into a table and saves the table as CSV.

pub mod boards;
pub mod collector;
pub mod config;
pub mod error;
pub mod generator;
pub mod interrupt;
#[cfg(feature = "serial")]
pub mod serial;
pub mod transport;

pub use error::CaptureError;
