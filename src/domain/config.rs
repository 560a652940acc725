use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default console baud rate of the Flipper USB CDC interface
pub const DEFAULT_BAUD_RATE: u32 = 230_400;
/// Default collection window for general commands
pub const DEFAULT_WINDOW_MS: u64 = 2_000;
/// Collection window for `subghz tx_from_file`
pub const TRANSMIT_WINDOW_MS: u64 = 3_000;
/// Sleep between input checks inside a collection window
pub const POLL_INTERVAL_MS: u64 = 50;
/// Result token reported when a transmit produces no text
pub const SUCCESS_MARKER: &str = "OK";

/// Flipper Remote configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipperConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial endpoint and port recovery
    #[serde(default)]
    pub device: DeviceConfig,
    /// Command/response framing
    #[serde(default)]
    pub protocol: ProtocolConfig,
    /// Remote storage layout
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Explicit endpoint; auto-detected when absent
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read/write timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Directory holding stable by-identifier symlinks
    #[serde(default = "default_by_id_dir")]
    pub by_id_dir: String,
    /// Vendor string matched inside by-id symlink names
    #[serde(default = "default_vendor")]
    pub vendor: String,
    /// USB interface suffix of the console port
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Fallback glob over generic ACM nodes
    #[serde(default = "default_acm_pattern")]
    pub acm_pattern: String,
    /// Applications known to hold the port open
    #[serde(default = "default_companion_apps")]
    pub companion_apps: Vec<String>,
    /// Wait after reclaiming the port, in milliseconds
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

/// Command/response framing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default = "default_window")]
    pub window_ms: u64,
    #[serde(default = "default_transmit_window")]
    pub transmit_window_ms: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Lines starting with any of these are console noise
    #[serde(default = "default_noise_prefixes")]
    pub noise_prefixes: Vec<String>,
}

/// Remote storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Directory on the device holding signal files
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Extension of signal files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_timeout() -> u64 {
    1000
}

fn default_by_id_dir() -> String {
    "/dev/serial/by-id".to_string()
}

fn default_vendor() -> String {
    "Flipper".to_string()
}

fn default_interface() -> String {
    "if00".to_string()
}

fn default_acm_pattern() -> String {
    "/dev/ttyACM*".to_string()
}

fn default_companion_apps() -> Vec<String> {
    vec!["qFlipper".to_string()]
}

fn default_settle() -> u64 {
    200
}

fn default_window() -> u64 {
    DEFAULT_WINDOW_MS
}

fn default_transmit_window() -> u64 {
    TRANSMIT_WINDOW_MS
}

fn default_poll_interval() -> u64 {
    POLL_INTERVAL_MS
}

fn default_noise_prefixes() -> Vec<String> {
    [
        "Welcome to Flipper",
        "Read the manual",
        "Run `help`",
        "Firmware version:",
        ">:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_directory() -> String {
    "/ext/subghz".to_string()
}

fn default_extension() -> String {
    "sub".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout(),
            by_id_dir: default_by_id_dir(),
            vendor: default_vendor(),
            interface: default_interface(),
            acm_pattern: default_acm_pattern(),
            companion_apps: default_companion_apps(),
            settle_ms: default_settle(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window(),
            transmit_window_ms: default_transmit_window(),
            poll_interval_ms: default_poll_interval(),
            noise_prefixes: default_noise_prefixes(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
        }
    }
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl ProtocolConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn transmit_window(&self) -> Duration {
        Duration::from_millis(self.transmit_window_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
