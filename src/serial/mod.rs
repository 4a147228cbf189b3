//! Serial port communication module
//!
//! This module provides functionality for:
//! - Opening a board's serial port for the collector and generator
//! - Listing available ports and matching them to known boards
//! - Monitoring raw serial output

pub mod monitor;
pub mod port;

pub use monitor::{MonitorConfig, SerialMonitor};
pub use port::{PortConfig, SerialConnection};
