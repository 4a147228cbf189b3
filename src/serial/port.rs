//! Serial port configuration and connection management
//!
//! Handles port discovery and connection for boards streaming samples.

use crate::boards::{self, BoardProfile};
use crate::config::SerialSection;
use crate::error::CaptureError;
use crate::transport::Transport;
use anyhow::{Context, Result};
use colored::Colorize;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyACM0, COM3)
    pub port_path: String,
    /// Baud rate (default: 9600, the usual sketch rate)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    /// Read timeout
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from(default_port_path()),
            baud_rate: crate::config::DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(crate::config::DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

#[cfg(windows)]
fn default_port_path() -> &'static str {
    "COM3"
}

#[cfg(not(windows))]
fn default_port_path() -> &'static str {
    "/dev/ttyACM0"
}

impl PortConfig {
    /// Create a new configuration with default 8N1 settings
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An open serial port
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
    config: PortConfig,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> Result<Self, CaptureError> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|e| CaptureError::TransportUnavailable {
                port: config.port_path.clone(),
                source: e.into(),
            })?;

        log::info!(
            "Opened {} at {} baud",
            config.port_path,
            config.baud_rate
        );
        Ok(Self { port, config })
    }

    /// Get the port configuration
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Clear input and output buffers
    pub fn clear_buffers(&mut self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .with_context(|| "Failed to clear serial buffers")
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialConnection {
    /// The port is usable once the driver answers a queue query
    fn is_ready(&mut self) -> bool {
        self.port.bytes_to_write().is_ok()
    }
}

/// Information about a detected serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub path: String,
    pub port_type: PortType,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

impl PortInfo {
    /// Board profile matching this port's USB identifiers
    pub fn board(&self) -> Option<&'static BoardProfile> {
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => boards::match_usb(vid, pid),
            _ => None,
        }
    }

    /// Settings for opening this port
    ///
    /// Without a configured baud rate the matched board's usual rate is used.
    pub fn port_config(&self, serial: &SerialSection) -> PortConfig {
        let fallback = self
            .board()
            .map_or(crate::config::DEFAULT_BAUD_RATE, |b| b.default_baud);
        PortConfig::new(&self.path)
            .with_baud_rate(serial.baud_rate_or(fallback))
            .with_timeout(serial.read_timeout())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortType {
    UsbSerial,
    PciSerial,
    Bluetooth,
    Unknown,
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortType::UsbSerial => write!(f, "USB Serial"),
            PortType::PciSerial => write!(f, "PCI Serial"),
            PortType::Bluetooth => write!(f, "Bluetooth"),
            PortType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// List all available serial ports
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().with_context(|| "Failed to enumerate serial ports")?;

    let port_infos: Vec<PortInfo> = ports
        .into_iter()
        .map(|p| {
            let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
                serialport::SerialPortType::UsbPort(info) => (
                    PortType::UsbSerial,
                    info.manufacturer,
                    info.product,
                    info.serial_number,
                    Some(info.vid),
                    Some(info.pid),
                ),
                serialport::SerialPortType::PciPort => {
                    (PortType::PciSerial, None, None, None, None, None)
                }
                serialport::SerialPortType::BluetoothPort => {
                    (PortType::Bluetooth, None, None, None, None, None)
                }
                serialport::SerialPortType::Unknown => {
                    (PortType::Unknown, None, None, None, None, None)
                }
            };

            PortInfo {
                path: p.port_name,
                port_type,
                manufacturer,
                product,
                serial_number,
                vid,
                pid,
            }
        })
        .collect();

    Ok(port_infos)
}

/// Print formatted list of available serial ports
pub fn print_ports() -> Result<()> {
    let ports = list_ports()?;

    if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
        println!("\n{}", "Troubleshooting tips:".cyan().bold());
        println!("  1. Connect the board with a data-capable USB cable");
        println!("  2. Check if the device is recognized: ls -la /dev/ttyUSB* /dev/ttyACM*");
        println!("  3. Add your user to the 'dialout' group: sudo usermod -aG dialout $USER");
        println!("  4. Check dmesg for connection events: dmesg | tail -20");
        return Ok(());
    }

    println!("{}", "Available Serial Ports:".green().bold());
    println!("{}", "=".repeat(60));

    for (idx, port) in ports.iter().enumerate() {
        println!("\n-> {:>2}: {}", idx + 1, port.path.white().bold());
        println!("  Type: {}", port.port_type);

        if let Some(ref mfg) = port.manufacturer {
            println!("  Manufacturer: {}", mfg);
        }
        if let Some(ref prod) = port.product {
            println!("  Product: {}", prod);
        }
        if let Some(ref sn) = port.serial_number {
            println!("  Serial: {}", sn);
        }
        if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
            println!("  VID:PID: {:04x}:{:04x}", vid, pid);
        }
        if let Some(board) = port.board() {
            println!(
                "  Board: {} [{}] (default baud {})",
                board.name.cyan(),
                board.id,
                board.default_baud
            );
            println!("         {}", board.description.dimmed());
        }
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "{}",
        "Use: serial-sampler collect -p <PORT> to start collecting".yellow()
    );

    Ok(())
}

/// Ports whose USB identifiers match a known board
pub fn detect_boards() -> Result<Vec<PortInfo>> {
    let ports = list_ports()?;
    Ok(ports.into_iter().filter(|p| p.board().is_some()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.port_path, default_port_path());
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyUSB0")
            .with_baud_rate(115200)
            .with_timeout(Duration::from_secs(1));

        assert_eq!(config.port_path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_open_missing_port() {
        let err = SerialConnection::open(PortConfig::new("/dev/serial-sampler-missing"))
            .err()
            .unwrap();
        match err {
            CaptureError::TransportUnavailable { port, .. } => {
                assert_eq!(port, "/dev/serial-sampler-missing")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_port_board_lookup() {
        let port = PortInfo {
            path: "/dev/ttyACM0".to_string(),
            port_type: PortType::UsbSerial,
            manufacturer: Some("Arduino (www.arduino.cc)".to_string()),
            product: None,
            serial_number: None,
            vid: Some(0x2341),
            pid: Some(0x0043),
        };
        assert_eq!(port.board().unwrap().id, "uno");

        let unknown = PortInfo {
            vid: None,
            pid: None,
            ..port
        };
        assert!(unknown.board().is_none());
    }

    #[test]
    fn test_detected_board_baud_rate() {
        let port = PortInfo {
            path: "/dev/ttyUSB0".to_string(),
            port_type: PortType::UsbSerial,
            manufacturer: Some("Silicon Labs".to_string()),
            product: None,
            serial_number: None,
            vid: Some(0x10c4),
            pid: Some(0xea60),
        };

        let mut serial = SerialSection::default();
        let config = port.port_config(&serial);
        assert_eq!(config.port_path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, serial.read_timeout());

        serial.baud_rate = Some(9600);
        assert_eq!(port.port_config(&serial).baud_rate, 9600);

        let unknown = PortInfo {
            vid: None,
            pid: None,
            ..port
        };
        assert_eq!(
            unknown.port_config(&SerialSection::default()).baud_rate,
            crate::config::DEFAULT_BAUD_RATE
        );
    }
}
