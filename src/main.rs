//! Serial Sampler
//!
//! Capture numeric samples printed by a microcontroller board into CSV, or
//! generate such a stream yourself.
//!
//! # Features
//!
//! - **Collector**: read a header line and N data lines from a serial port
//!   and save them as CSV
//! - **Generator**: emit `Integers, Floats` followed by one random
//!   `<integer> <float>` line per interval, to a serial port or stdout
//! - **Port listing and monitor**: find the board and watch its raw output
//!   (requires the `serial` feature, enabled by default)
//!
//! # Usage
//!
//! ```bash
//! # List available serial ports
//! serial-sampler ports
//!
//! # Capture 100 samples into default.csv
//! serial-sampler collect -p /dev/ttyACM0 -b 9600 -n 100
//!
//! # Pipe the generator straight into the collector
//! serial-sampler generate --stdout --count 10 | serial-sampler collect --stdin -n 10 -o run.csv
//!
//! # Write a starter config file
//! serial-sampler config init -o serial-sampler.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Read};
use std::path::PathBuf;

use serial_sampler::collector::{
    resolve_output_path, Collector, CollectorSettings, Dataset, MalformedPolicy, ProgressMode,
    SessionProgress,
};
use serial_sampler::config::{self, Config, SerialSection};
use serial_sampler::generator::{Generator, SystemClock};
use serial_sampler::interrupt;
use serial_sampler::transport::Transport;

#[cfg(feature = "serial")]
use serial_sampler::serial::{self, MonitorConfig, PortConfig, SerialConnection};
#[cfg(feature = "serial")]
use std::time::Duration;

/// Rows shown in the summary after a session
const PREVIEW_ROWS: usize = 5;

#[cfg(not(feature = "serial"))]
const NO_SERIAL_SUPPORT: &str = "Serial support is not compiled in; rebuild with --features serial";

/// Serial Sampler
///
/// Random sample generator and serial-to-CSV collector
#[derive(Parser)]
#[command(name = "serial-sampler")]
#[command(version)]
#[command(about = "Random sample generator and serial-to-CSV collector for microcontroller boards")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./serial-sampler.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture samples from a board into a CSV file
    Collect(CollectArgs),

    /// Emit a header and random samples at a fixed interval
    Generate(GenerateArgs),

    /// List available serial ports
    Ports,

    /// Print raw serial output
    Monitor {
        /// Serial port path (e.g., /dev/ttyACM0)
        #[arg(short, long)]
        port: Option<String>,

        /// Baud rate
        #[arg(short, long)]
        baud: Option<u32>,

        /// Log output to file
        #[arg(short, long)]
        log: Option<String>,

        /// Disable timestamps
        #[arg(long)]
        no_timestamps: bool,
    },

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(clap::Args)]
struct CollectArgs {
    /// Serial port path (e.g., /dev/ttyACM0, COM3)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, must match the board's sketch
    #[arg(short, long)]
    baud: Option<u32>,

    /// Number of samples to capture (header excluded)
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read the stream from stdin instead of a serial port
    #[arg(long)]
    stdin: bool,

    /// Print every row as it is collected instead of a progress bar
    #[arg(long, conflicts_with = "quiet")]
    echo: bool,

    /// No progress output
    #[arg(long)]
    quiet: bool,

    /// End the session on the first malformed line instead of skipping it
    #[arg(long)]
    abort_on_malformed: bool,

    /// Keep an existing output file and write to a numbered name instead
    #[arg(long)]
    no_overwrite: bool,

    /// The board does not print a header line; generate column names
    #[arg(long)]
    no_header: bool,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Serial port path to write samples to
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Write to stdout instead of a serial port
    #[arg(long)]
    stdout: bool,

    /// Stop after this many samples
    #[arg(long)]
    count: Option<u64>,

    /// Milliseconds between samples
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Do not emit the header line
    #[arg(long)]
    no_header: bool,

    /// Seed for a reproducible stream
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a commented default config
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Config commands must work with a missing or broken config file
    let command = match cli.command {
        Commands::Config(cmd) => return handle_config(cmd, cli.config),
        command => command,
    };

    let config = Config::load(cli.config.as_deref())?;
    match command {
        Commands::Collect(args) => handle_collect(args, config),
        Commands::Generate(args) => handle_generate(args, config),
        Commands::Ports => handle_ports(),
        Commands::Monitor {
            port,
            baud,
            log,
            no_timestamps,
        } => handle_monitor(config, port, baud, log, no_timestamps),
        Commands::Config(cmd) => handle_config(cmd, cli.config),
    }
}

fn handle_collect(args: CollectArgs, mut config: Config) -> Result<()> {
    if args.port.is_some() {
        config.serial.port = args.port;
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = Some(baud);
    }
    let section = &mut config.collector;
    if let Some(samples) = args.samples {
        section.num_of_samples = samples;
    }
    if let Some(output) = args.output {
        section.output = output;
    }
    if args.echo {
        section.progress = ProgressMode::Echo;
    }
    if args.quiet {
        section.progress = ProgressMode::Quiet;
    }
    if args.abort_on_malformed {
        section.malformed_rows = MalformedPolicy::Abort;
    }
    if args.no_overwrite {
        section.overwrite = false;
    }
    if args.no_header {
        section.headers_printed = false;
    }
    config.validate()?;

    let section = &config.collector;
    let num_of_samples = section.num_of_samples;
    let output = resolve_output_path(&section.output, section.overwrite);
    let settings = section.settings();

    println!(
        "{} Collecting {} samples into {}",
        "[*]".cyan().bold(),
        num_of_samples,
        output.display().to_string().white()
    );

    let progress = SessionProgress::new(section.progress, num_of_samples);
    let result = if args.stdin {
        collect_with(
            Collector::new(io::stdin().lock(), settings),
            num_of_samples,
            &progress,
        )
    } else {
        collect_from_port(&config.serial, settings, num_of_samples, &progress)
    };
    progress.finish();

    let dataset = result.context("Data collection failed, nothing was saved")?;

    println!("{} Data collection finished", "[OK]".green().bold());
    println!("\n{}", "Sample of collected data:".white().bold());
    print!("{}", dataset.preview(PREVIEW_ROWS));

    dataset.save(&output)?;
    println!(
        "\n{} Saved as \"{}\"",
        "[OK]".green().bold(),
        output.display()
    );

    Ok(())
}

fn collect_with<R: Read>(
    mut collector: Collector<R>,
    num_of_samples: usize,
    progress: &SessionProgress,
) -> Result<Dataset> {
    let dataset = collector.read_session(num_of_samples, progress)?;

    let stats = collector.stats();
    if stats.skipped > 0 {
        progress.suspend(|| {
            println!(
                "{} Skipped {} malformed lines",
                "[WARNING]".yellow().bold(),
                stats.skipped
            )
        });
    }
    Ok(dataset)
}

#[cfg(feature = "serial")]
fn collect_from_port(
    serial: &SerialSection,
    settings: CollectorSettings,
    num_of_samples: usize,
    progress: &SessionProgress,
) -> Result<Dataset> {
    let port_config = resolve_port_config(serial)?;
    let collector = Collector::open(port_config, settings)?;
    collect_with(collector, num_of_samples, progress)
}

#[cfg(not(feature = "serial"))]
fn collect_from_port(
    _serial: &SerialSection,
    _settings: CollectorSettings,
    _num_of_samples: usize,
    _progress: &SessionProgress,
) -> Result<Dataset> {
    anyhow::bail!("{} (or read from --stdin)", NO_SERIAL_SUPPORT)
}

fn handle_generate(args: GenerateArgs, mut config: Config) -> Result<()> {
    if args.port.is_some() {
        config.serial.port = args.port;
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = Some(baud);
    }
    let section = &mut config.generator;
    if let Some(interval_ms) = args.interval_ms {
        section.interval_ms = interval_ms;
    }
    if args.no_header {
        section.emit_header = false;
    }
    if args.seed.is_some() {
        section.seed = args.seed;
    }
    config.validate()?;

    let rng = match config.generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut generator = Generator::new(config.generator.settings(), rng);

    let mut transport: Box<dyn Transport> = if args.stdout {
        Box::new(io::stdout())
    } else {
        open_sink(&config.serial)?
    };

    let running = interrupt::install()?;
    eprintln!(
        "{} Emitting a sample every {} ms{}",
        "[*]".cyan().bold(),
        generator.settings().interval_ms,
        args.count
            .map(|count| format!(", {} total", count))
            .unwrap_or_default()
    );

    generator.initialize(&mut transport)?;
    let emitted = generator.run(&mut transport, &SystemClock::new(), &running, args.count)?;

    eprintln!("{} Emitted {} samples", "[OK]".green().bold(), emitted);
    Ok(())
}

#[cfg(feature = "serial")]
fn open_sink(serial: &SerialSection) -> Result<Box<dyn Transport>> {
    let connection = SerialConnection::open(resolve_port_config(serial)?)?;
    Ok(Box::new(connection))
}

#[cfg(not(feature = "serial"))]
fn open_sink(_serial: &SerialSection) -> Result<Box<dyn Transport>> {
    anyhow::bail!("{} (or write to --stdout)", NO_SERIAL_SUPPORT)
}

/// Port settings from config, auto-detecting the port if none is set
#[cfg(feature = "serial")]
fn resolve_port_config(serial: &SerialSection) -> Result<PortConfig> {
    if let Some(ref port_path) = serial.port {
        return Ok(PortConfig::new(port_path)
            .with_baud_rate(serial.baud_rate_or(config::DEFAULT_BAUD_RATE))
            .with_timeout(serial.read_timeout()));
    }

    let detected = serial::port::detect_boards()?;
    let first = detected.first().ok_or_else(|| {
        anyhow::anyhow!(
            "No known board detected. Use -p to specify the port, or 'serial-sampler ports' to list them"
        )
    })?;
    let port_config = first.port_config(serial);
    println!(
        "{} Auto-detected: {}{} at {} baud",
        "[OK]".green().bold(),
        first.path.white(),
        first
            .board()
            .map(|b| format!(" ({})", b.name))
            .unwrap_or_default(),
        port_config.baud_rate
    );

    Ok(port_config)
}

#[cfg(feature = "serial")]
fn handle_ports() -> Result<()> {
    serial::port::print_ports()
}

#[cfg(not(feature = "serial"))]
fn handle_ports() -> Result<()> {
    anyhow::bail!(NO_SERIAL_SUPPORT)
}

#[cfg(not(feature = "serial"))]
fn handle_monitor(
    _config: Config,
    _port: Option<String>,
    _baud: Option<u32>,
    _log: Option<String>,
    _no_timestamps: bool,
) -> Result<()> {
    anyhow::bail!(NO_SERIAL_SUPPORT)
}

#[cfg(feature = "serial")]
fn handle_monitor(
    mut config: Config,
    port: Option<String>,
    baud: Option<u32>,
    log: Option<String>,
    no_timestamps: bool,
) -> Result<()> {
    if port.is_some() {
        config.serial.port = port;
    }
    if let Some(baud) = baud {
        config.serial.baud_rate = Some(baud);
    }
    config.validate()?;

    // Short timeout so Ctrl+C is noticed between lines
    let port_config = resolve_port_config(&config.serial)?.with_timeout(Duration::from_millis(100));

    let monitor_config = MonitorConfig {
        port_config,
        show_timestamps: !no_timestamps,
        log_file: log,
    };

    serial::monitor::run_monitor(monitor_config)
}

fn handle_config(cmd: ConfigCommands, path: Option<PathBuf>) -> Result<()> {
    match cmd {
        ConfigCommands::Init { output } => {
            let content = config::generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} Config written to {}",
                    "[OK]".green().bold(),
                    path.display()
                );
            } else {
                print!("{}", content);
            }
        }

        ConfigCommands::Show => {
            let config = Config::load(path.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
