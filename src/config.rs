//! Configuration file (serial-sampler.toml) loading
//!
//! Every field has a default, so an empty or missing file is valid.
//! Command-line flags are applied on top of the loaded values.

use crate::collector::{CollectorSettings, MalformedPolicy, ProgressMode};
use crate::generator::{self, GeneratorSettings};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "serial-sampler.toml";

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_NUM_OF_SAMPLES: usize = 100;
pub const DEFAULT_OUTPUT: &str = "default.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialSection,
    pub collector: CollectorSection,
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSection {
    /// Port path; auto-detected from known boards when absent
    pub port: Option<String>,
    /// Unset means the detected board's usual rate, or `DEFAULT_BAUD_RATE`
    pub baud_rate: Option<u32>,
    pub read_timeout_ms: u64,
}

impl Default for SerialSection {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SerialSection {
    /// Configured baud rate, or `fallback` when none is set
    pub fn baud_rate_or(&self, fallback: u32) -> u32 {
        self.baud_rate.unwrap_or(fallback)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSection {
    pub num_of_samples: usize,
    pub headers_printed: bool,
    pub malformed_rows: MalformedPolicy,
    pub output: PathBuf,
    pub overwrite: bool,
    pub progress: ProgressMode,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            num_of_samples: DEFAULT_NUM_OF_SAMPLES,
            headers_printed: true,
            malformed_rows: MalformedPolicy::Skip,
            output: PathBuf::from(DEFAULT_OUTPUT),
            overwrite: true,
            progress: ProgressMode::Bar,
        }
    }
}

impl CollectorSection {
    pub fn settings(&self) -> CollectorSettings {
        CollectorSettings {
            headers_printed: self.headers_printed,
            malformed: self.malformed_rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub interval_ms: u64,
    pub emit_header: bool,
    pub int_lower: i64,
    pub int_upper: i64,
    pub float_scale: f64,
    pub float_precision: usize,
    /// Fixed RNG seed for reproducible streams
    pub seed: Option<u64>,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        let defaults = GeneratorSettings::default();
        Self {
            interval_ms: defaults.interval_ms,
            emit_header: defaults.emit_header,
            int_lower: defaults.int_lower,
            int_upper: defaults.int_upper,
            float_scale: defaults.float_scale,
            float_precision: defaults.float_precision,
            seed: None,
        }
    }
}

impl GeneratorSection {
    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            interval_ms: self.interval_ms,
            emit_header: self.emit_header,
            int_lower: self.int_lower,
            int_upper: self.int_upper,
            float_scale: self.float_scale,
            float_precision: self.float_precision,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default file if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse_content(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse_content(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator or the port cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.serial.baud_rate == Some(0) {
            bail!("serial.baud_rate must be greater than zero");
        }
        if self.generator.interval_ms == 0 {
            bail!("generator.interval_ms must be greater than zero");
        }
        if !(self.generator.float_scale > 0.0) {
            bail!(
                "generator.float_scale must be positive, got {}",
                self.generator.float_scale
            );
        }
        let (smallest, largest) = generator::random::float_bounds(self.generator.float_scale);
        let precision = self.generator.float_precision;
        let printed = |x: f64| format!("{:.*}", precision, x).parse::<f64>().unwrap_or(x);
        if printed(smallest) <= 0.0 || printed(largest) >= self.generator.float_scale {
            bail!(
                "generator.float_precision ({}) is too coarse for float_scale {}: values would print as 0 or {}",
                precision,
                self.generator.float_scale,
                self.generator.float_scale
            );
        }
        if self.generator.int_lower >= self.generator.int_upper {
            bail!(
                "generator.int_lower ({}) must be below generator.int_upper ({})",
                self.generator.int_lower,
                self.generator.int_upper
            );
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Commented starter config written by `config init`
pub fn generate_default_config() -> String {
    format!(
        r#"# serial-sampler configuration

[serial]
# Serial port the board is attached to. Leave unset to auto-detect a known board.
# port = "/dev/ttyACM0"
# Leave unset to use the detected board's usual rate ({baud} for unknown ports)
# baud_rate = {baud}
# Abort a session if no data arrives for this long
read_timeout_ms = {timeout}

[collector]
# Rows to capture, not counting the header line
num_of_samples = {samples}
# Set to false if the board does not print a header line first
headers_printed = true
# "skip" drops lines with the wrong number of fields, "abort" ends the session
malformed_rows = "skip"
output = "{output}"
# When false an existing file is kept and a numbered name is used instead
overwrite = true
# "bar", "echo" or "quiet"
progress = "bar"

[generator]
interval_ms = {interval}
emit_header = true
int_lower = {lower}
int_upper = {upper}
float_scale = {scale:?}
float_precision = {precision}
# seed = 42
"#,
        baud = DEFAULT_BAUD_RATE,
        timeout = DEFAULT_READ_TIMEOUT_MS,
        samples = DEFAULT_NUM_OF_SAMPLES,
        output = DEFAULT_OUTPUT,
        interval = generator::DEFAULT_INTERVAL_MS,
        lower = generator::random::DEFAULT_INT_LOWER,
        upper = generator::random::DEFAULT_INT_UPPER,
        scale = generator::random::DEFAULT_FLOAT_SCALE,
        precision = generator::DEFAULT_FLOAT_PRECISION,
    )
}
