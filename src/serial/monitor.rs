//! Serial output monitor
//!
//! Prints every line a board sends, with:
//! - Timestamped output
//! - Highlighting of lines that are not purely numeric
//! - Log file export

use crate::collector::parse::{split_fields, Value};
use crate::error::CaptureError;
use crate::serial::{PortConfig, SerialConnection};
use crate::transport::LineReader;
use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for serial monitoring
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Port configuration
    pub port_config: PortConfig,
    /// Enable timestamp prefixes
    pub show_timestamps: bool,
    /// Log file path (optional)
    pub log_file: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port_config: PortConfig::default(),
            show_timestamps: true,
            log_file: None,
        }
    }
}

/// What a monitored line looked like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Every field parses as a number
    Numeric,
    /// At least one field is text, e.g. a header
    Text,
    Blank,
}

pub fn classify_line(line: &str) -> LineKind {
    let fields = split_fields(line);
    if fields.is_empty() {
        LineKind::Blank
    } else if fields.iter().all(|f| Value::parse(f).is_numeric()) {
        LineKind::Numeric
    } else {
        LineKind::Text
    }
}

/// Serial output monitor
pub struct SerialMonitor {
    config: MonitorConfig,
    log_writer: Option<BufWriter<File>>,
    line_count: usize,
    text_count: usize,
    running: Arc<AtomicBool>,
}

impl SerialMonitor {
    /// Create a new serial monitor with the given configuration
    pub fn new(config: MonitorConfig, running: Arc<AtomicBool>) -> Self {
        Self {
            config,
            log_writer: None,
            line_count: 0,
            text_count: 0,
            running,
        }
    }

    /// Connect to the serial port
    pub fn connect(&mut self) -> Result<SerialConnection> {
        let connection = SerialConnection::open(self.config.port_config.clone())?;

        println!(
            "{} Connected to {} at {} baud",
            "[OK]".green().bold(),
            connection.config().port_path.white().bold(),
            connection.config().baud_rate
        );

        // Setup log file if configured
        if let Some(ref log_path) = self.config.log_file {
            let file = File::create(log_path)
                .with_context(|| format!("Failed to create log file: {}", log_path))?;
            self.log_writer = Some(BufWriter::new(file));
            println!(
                "{} Logging to: {}",
                "[LOG]".cyan().bold(),
                log_path.white()
            );
        }

        Ok(connection)
    }

    /// Print lines from `source` until stopped or the source disconnects
    pub fn watch<R: Read>(&mut self, source: R) -> Result<()> {
        let mut reader = LineReader::new(source);

        println!("{}", "\n--- Serial Monitor Started ---".cyan().bold());
        println!("{}", "Press Ctrl+C to stop\n".yellow());
        self.print_header();

        while self.running.load(Ordering::SeqCst) {
            match reader.read_line() {
                Ok(line) => self.process_line(&line)?,
                // No data yet, poll again
                Err(CaptureError::ReadTimeout) => continue,
                Err(e @ CaptureError::Disconnected(_)) => {
                    eprintln!("{} {}", "[ERROR]".red().bold(), e);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.print_summary();
        Ok(())
    }

    /// Process a single line of output
    fn process_line(&mut self, line: &str) -> Result<()> {
        self.line_count += 1;

        let kind = classify_line(line);
        if kind == LineKind::Text {
            self.text_count += 1;
        }

        println!("{}", self.format_line(line, kind));

        // Write to log file
        if let Some(ref mut writer) = self.log_writer {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(writer, "[{}] {}", timestamp, line)?;
            writer.flush()?;
        }

        Ok(())
    }

    /// Format a line for display
    fn format_line(&self, line: &str, kind: LineKind) -> String {
        let mut output = String::new();

        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S%.3f");
            output.push_str(&format!("{} ", timestamp.to_string().dimmed()));
        }

        match kind {
            LineKind::Text => output.push_str(&line.yellow().to_string()),
            LineKind::Numeric | LineKind::Blank => output.push_str(line),
        }

        output
    }

    /// Print monitor header
    fn print_header(&self) {
        println!("{}", "=".repeat(70).dimmed());
        println!(
            "{}: {}",
            "Port".cyan(),
            self.config.port_config.port_path.white()
        );
        println!(
            "{}: {}",
            "Baud".cyan(),
            self.config.port_config.baud_rate.to_string().white()
        );
        if let Some(ref log) = self.config.log_file {
            println!("{}: {}", "Log".cyan(), log.white());
        }
        println!("{}", "=".repeat(70).dimmed());
        println!();
    }

    /// Print summary statistics
    fn print_summary(&self) {
        println!("\n{}", "=".repeat(70).dimmed());
        println!("{}", "--- Monitor Summary ---".cyan().bold());
        println!("Total lines: {}", self.line_count);
        println!("Non-numeric lines: {}", self.text_count);
        if let Some(ref log) = self.config.log_file {
            println!("Log saved to: {}", log.white());
        }
        println!("{}", "=".repeat(70).dimmed());
    }
}

/// Connect and monitor until Ctrl+C
pub fn run_monitor(config: MonitorConfig) -> Result<()> {
    let running = crate::interrupt::install()?;
    let mut monitor = SerialMonitor::new(config, running);

    let connection = monitor.connect()?;
    monitor.watch(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("42 0.3782"), LineKind::Numeric);
        assert_eq!(classify_line("Integers, Floats"), LineKind::Text);
        assert_eq!(classify_line("  "), LineKind::Blank);
    }

    #[test]
    fn test_watch_until_disconnect() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("monitor.log");

        let config = MonitorConfig {
            show_timestamps: false,
            log_file: Some(log_path.to_string_lossy().to_string()),
            ..Default::default()
        };
        let mut monitor = SerialMonitor::new(config, Arc::new(AtomicBool::new(true)));
        monitor.log_writer = Some(BufWriter::new(File::create(&log_path).unwrap()));

        monitor
            .watch(Cursor::new(b"Integers, Floats\n1 0.5\n2 0.25\n".to_vec()))
            .unwrap();

        assert_eq!(monitor.line_count, 3);
        assert_eq!(monitor.text_count, 1);

        let logged = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(logged.lines().count(), 3);
        assert!(logged.lines().last().unwrap().ends_with("] 2 0.25"));
    }

    #[test]
    fn test_watch_stopped() {
        let mut monitor = SerialMonitor::new(
            MonitorConfig::default(),
            Arc::new(AtomicBool::new(false)),
        );
        monitor.watch(Cursor::new(b"1 2\n".to_vec())).unwrap();
        assert_eq!(monitor.line_count, 0);
    }
}
