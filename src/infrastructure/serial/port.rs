use crate::domain::config::DeviceConfig;
use crate::domain::error::{FlipperError, FlipperResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How an endpoint was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointSource {
    Discovered,
    Explicit,
}

/// OS path of the device's serial character device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: PathBuf,
    pub source: EndpointSource,
}

impl Endpoint {
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: EndpointSource::Explicit,
        }
    }

    pub fn discovered(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: EndpointSource::Discovered,
        }
    }

    pub fn path_str(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Locates the Flipper console port among OS device nodes
#[derive(Debug, Clone)]
pub struct PortResolver {
    by_id_dir: PathBuf,
    vendor: String,
    interface: String,
    acm_pattern: String,
}

impl PortResolver {
    pub fn new(
        by_id_dir: impl Into<PathBuf>,
        vendor: impl Into<String>,
        interface: impl Into<String>,
        acm_pattern: impl Into<String>,
    ) -> Self {
        Self {
            by_id_dir: by_id_dir.into(),
            vendor: vendor.into(),
            interface: interface.into(),
            acm_pattern: acm_pattern.into(),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(
            &config.by_id_dir,
            &config.vendor,
            &config.interface,
            &config.acm_pattern,
        )
    }

    fn by_id_pattern(&self) -> String {
        let dir = glob::Pattern::escape(&self.by_id_dir.to_string_lossy());
        format!(
            "{}/*{}*{}",
            dir,
            glob::Pattern::escape(&self.vendor),
            glob::Pattern::escape(&self.interface)
        )
    }

    /// Find the endpoint: by-id symlinks first (resolved to their target),
    /// then ACM nodes. Candidates are taken in lexicographic order.
    pub fn detect(&self) -> FlipperResult<Endpoint> {
        let by_id_pattern = self.by_id_pattern();

        for link in sorted_matches(&by_id_pattern)? {
            match std::fs::canonicalize(&link) {
                Ok(real) => {
                    info!("Detected Flipper at {} (via {})", real.display(), link.display());
                    return Ok(Endpoint::discovered(real));
                }
                // Stale link left behind after an unplug
                Err(e) => debug!("Skipping {}: {}", link.display(), e),
            }
        }

        if let Some(node) = sorted_matches(&self.acm_pattern)?.into_iter().next() {
            info!("Detected Flipper at {} (ACM fallback)", node.display());
            return Ok(Endpoint::discovered(node));
        }

        Err(FlipperError::DeviceNotFound {
            searched: format!("{}, {}", by_id_pattern, self.acm_pattern),
        })
    }

    /// Use `explicit` when given, otherwise [`PortResolver::detect`]
    pub fn resolve(&self, explicit: Option<&str>) -> FlipperResult<Endpoint> {
        match explicit {
            Some(path) => Ok(Endpoint::explicit(path)),
            None => self.detect(),
        }
    }
}

fn sorted_matches(pattern: &str) -> FlipperResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| FlipperError::Config {
        message: format!("Invalid device pattern '{}': {}", pattern, e),
    })?;

    let mut candidates: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    candidates.sort();
    Ok(candidates)
}

/// Best-effort release of an endpoint held by other processes.
///
/// Implementations never fail; the caller retries its open regardless.
pub trait PortReclaimer {
    fn reclaim(&self, endpoint: &Endpoint);
}

/// Terminates processes holding the device node open.
///
/// Holders are discovered with `lsof` and `fuser` (either may be missing),
/// companion applications are stopped with `pkill -f`.
#[derive(Debug, Clone)]
pub struct ProcessReclaimer {
    companion_apps: Vec<String>,
    settle: Duration,
}

impl ProcessReclaimer {
    pub fn new(companion_apps: Vec<String>, settle: Duration) -> Self {
        Self {
            companion_apps,
            settle,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.companion_apps.clone(), config.settle())
    }

    fn holders(&self, device: &Path) -> Vec<u32> {
        let mut pids = Vec::new();
        for (program, args) in [("lsof", &["-t"][..]), ("fuser", &[][..])] {
            match Command::new(program).args(args).arg(device).output() {
                Ok(output) => {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    for pid in parse_pids(&stdout) {
                        if !pids.contains(&pid) {
                            pids.push(pid);
                        }
                    }
                }
                Err(e) => debug!("{} unavailable: {}", program, e),
            }
        }
        pids.retain(|pid| *pid != std::process::id());
        pids
    }

    fn stop_companions(&self) {
        for app in &self.companion_apps {
            match Command::new("pkill").arg("-f").arg(app).output() {
                Ok(output) if output.status.success() => info!("Stopped {}", app),
                Ok(_) => debug!("No running {} found", app),
                Err(e) => debug!("pkill unavailable: {}", e),
            }
        }
    }
}

impl PortReclaimer for ProcessReclaimer {
    fn reclaim(&self, endpoint: &Endpoint) {
        warn!("Reclaiming busy port {}", endpoint);

        for pid in self.holders(&endpoint.path) {
            terminate(pid);
        }
        self.stop_companions();

        std::thread::sleep(self.settle);
    }
}

#[cfg(unix)]
fn terminate(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        debug!("Ignoring out-of-range pid {}", pid);
        return;
    };
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => info!("Sent SIGTERM to process {}", pid),
        Err(e) => debug!("Could not terminate process {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn terminate(pid: u32) {
    debug!("Process termination unsupported on this platform (pid {})", pid);
}

/// Pids from `lsof -t` / `fuser` output; fuser may append access letters.
///
/// Only values that name a single process are kept: 0 and anything past
/// `i32::MAX` would signal a process group or every process.
fn parse_pids(output: &str) -> Vec<u32> {
    output
        .split_whitespace()
        .filter_map(|token| {
            token
                .trim_end_matches(|c: char| c.is_ascii_alphabetic())
                .parse::<u32>()
                .ok()
        })
        .filter(|pid| *pid != 0 && i32::try_from(*pid).is_ok())
        .collect()
}
