use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Highest repeat count accepted by `run`
pub const MAX_REPEAT: u32 = 100;
/// Highest sub-GHz radio index accepted by `run`
pub const MAX_DEVICE: u32 = 3;

/// Command line arguments for Flipper Remote
#[derive(Parser, Debug)]
#[command(
    name = "flipper-remote",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drive a Flipper Zero over its USB serial console",
    long_about = "Sends CLI commands to a Flipper Zero over its USB serial console, recovering the port from other programs, and lists or transmits stored sub-GHz signal files."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Serial port path (auto-detected when omitted)
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the detected serial port
    Detect,
    /// Terminate processes holding the serial port
    Free,
    /// Send a CLI command and print the response
    Send(SendArgs),
    /// List signal files stored on the device
    List(ListArgs),
    /// Transmit a signal file stored on the device
    Run(RunArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

/// Arguments of `send`
#[derive(ClapArgs, Debug)]
pub struct SendArgs {
    /// Command line sent to the device, e.g. "device_info"
    pub command: String,

    /// Print every response line instead of the last one
    #[arg(short, long)]
    pub all: bool,

    /// Collection window in seconds
    #[arg(short, long)]
    pub window: Option<f64>,
}

/// Arguments of `list`
#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// File extension to look for (defaults to the configured one)
    #[arg(short, long)]
    pub extension: Option<String>,
}

/// Arguments of `run`
#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Script name (e.g. Win_stop) or full device path
    pub target: String,

    /// Number of repeats
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=MAX_REPEAT as i64))]
    pub repeat: u32,

    /// RF device index
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=MAX_DEVICE as i64))]
    pub device: u32,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Show configuration file locations
    Path,
    /// Create default configuration
    Init {
        /// Write the global configuration instead of a project one
        #[arg(short, long)]
        global: bool,
    },
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
