use crate::core::communication::Command;
use crate::core::session::{Clock, Connector, SystemClock};
use crate::domain::config::RemoteConfig;
use crate::domain::error::{FlipperError, FlipperResult};
use crate::infrastructure::serial::{NativeOpener, PortOpener, PortReclaimer, ProcessReclaimer};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// A signal file stored on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Base name without extension
    pub name: String,
    /// Full path on the device
    pub path: String,
}

/// Device-side file operations consumed by the CLI
pub struct RemoteService<O, R, C = SystemClock> {
    connector: Connector<O, R, C>,
    remote: RemoteConfig,
}

pub type NativeRemoteService = RemoteService<NativeOpener, ProcessReclaimer, SystemClock>;

impl<O, R, C> RemoteService<O, R, C>
where
    O: PortOpener,
    R: PortReclaimer,
    C: Clock + Clone,
{
    pub fn new(connector: Connector<O, R, C>, remote: RemoteConfig) -> Self {
        Self { connector, remote }
    }

    /// List files with `extension` (default from config) under the remote
    /// directory.
    ///
    /// Runs a recursive listing and then a plain one in the same session;
    /// some firmware builds only answer one of them. Names are deduplicated,
    /// first discovery wins.
    pub fn list_remote(&self, extension: Option<&str>) -> FlipperResult<Vec<RemoteFile>> {
        let extension = extension.unwrap_or(self.remote.extension.as_str());
        let directory = self.remote.directory.as_str();
        let scanner = ListingScanner::new(directory, extension)?;

        let files = self
            .connector
            .with_session(|session| {
                let mut lines = Vec::new();
                for recursive in [true, false] {
                    let command = Command::storage_list(directory, recursive);
                    lines.extend(session.exchange(&command)?.into_lines());
                }
                Ok(lines)
            })
            .map(|lines| scanner.scan(&lines))
            .map_err(FlipperError::list_failed)?;

        info!("Found {} .{} file(s) under {}", files.len(), extension, directory);
        Ok(files)
    }

    /// Look up a file by name, with or without its extension
    pub fn find_remote(&self, name: &str) -> FlipperResult<Option<RemoteFile>> {
        let suffix = format!(".{}", self.remote.extension);
        let wanted = name.strip_suffix(suffix.as_str()).unwrap_or(name);

        let files = self.list_remote(None)?;
        Ok(files.into_iter().find(|file| file.name == wanted))
    }

    /// Transmit a stored signal file; any failure is reported as
    /// [`FlipperError::RunFailed`].
    pub fn run_remote(&self, path: &str, repeat: u32, device: u32) -> FlipperResult<String> {
        let result = self
            .connector
            .with_session(|session| session.transmit_stored_signal(path, repeat, device))
            .map_err(FlipperError::run_failed)?;

        info!("Transmitted {} (repeat {}, device {}): {}", path, repeat, device, result);
        Ok(result)
    }
}

impl NativeRemoteService {
    pub fn from_config(config: &crate::domain::config::FlipperConfig) -> Self {
        Self::new(Connector::from_config(config), config.remote.clone())
    }
}

/// Picks file tokens out of `storage list` output
#[derive(Debug)]
pub struct ListingScanner {
    directory: String,
    pattern: Regex,
}

impl ListingScanner {
    pub fn new(directory: &str, extension: &str) -> FlipperResult<Self> {
        let extension = extension.trim_start_matches('.');
        let pattern = Regex::new(&format!(r"(?i)\S+\.{}", regex::escape(extension))).map_err(|e| {
            FlipperError::InvalidInput(format!("Invalid extension '{}': {}", extension, e))
        })?;

        Ok(Self {
            directory: directory.trim_end_matches('/').to_string(),
            pattern,
        })
    }

    pub fn scan(&self, lines: &[String]) -> Vec<RemoteFile> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for token in lines.iter().flat_map(|line| self.pattern.find_iter(line)) {
            let token = token.as_str();
            let file_name = token.rsplit('/').next().unwrap_or(token);
            // The match always ends in `.<ext>` (any case)
            let name = file_name
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(file_name);

            if !seen.insert(name.to_string()) {
                debug!("Skipping duplicate {}", token);
                continue;
            }

            let path = if token.starts_with('/') {
                token.to_string()
            } else {
                format!("{}/{}", self.directory, file_name)
            };
            files.push(RemoteFile {
                name: name.to_string(),
                path,
            });
        }

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{FlipperConfig, SUCCESS_MARKER};
    use crate::testing::{FakeOpener, ManualClock, RecordingReclaimer};
    use std::time::Duration;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn service(opener: &FakeOpener) -> RemoteService<FakeOpener, RecordingReclaimer, ManualClock> {
        let mut config = FlipperConfig::default();
        config.device.port = Some("/dev/ttyACM0".to_string());
        let connector = Connector::new(&config, opener.clone(), RecordingReclaimer::new(), ManualClock::new());
        RemoteService::new(connector, config.remote)
    }

    #[test]
    fn test_scan_full_paths_and_bare_names() {
        let scanner = ListingScanner::new("/ext/subghz", "sub").unwrap();
        let files = scanner.scan(&lines(&[
            "/ext/subghz/Win_stop.sub",
            "[F] Win_up.sub 1234b",
            "[D] assets",
            "[F] notes.txt 10b",
        ]));

        assert_eq!(
            files,
            vec![
                RemoteFile {
                    name: "Win_stop".to_string(),
                    path: "/ext/subghz/Win_stop.sub".to_string(),
                },
                RemoteFile {
                    name: "Win_up".to_string(),
                    path: "/ext/subghz/Win_up.sub".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_scan_is_case_insensitive() {
        let scanner = ListingScanner::new("/ext/subghz/", ".sub").unwrap();
        let files = scanner.scan(&lines(&["[F] GARAGE.SUB 512b"]));

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "GARAGE");
        assert_eq!(files[0].path, "/ext/subghz/GARAGE.SUB");
    }

    #[test]
    fn test_list_dedupes_across_both_passes() {
        let opener = FakeOpener::new();
        let link = opener.link();
        link.push_reply(vec![Some(
            b"/ext/subghz/Win_stop.sub\r\n/ext/subghz/gates/B_open.sub\r\n>: ".to_vec(),
        )]);
        link.push_reply(vec![Some(
            b"[F] Win_stop.sub 2048b\r\n[F] Win_down.sub 1024b\r\n>: ".to_vec(),
        )]);

        let files = service(&opener).list_remote(None).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Win_stop", "B_open", "Win_down"]);
        assert_eq!(files[0].path, "/ext/subghz/Win_stop.sub");
        assert_eq!(files[1].path, "/ext/subghz/gates/B_open.sub");
        assert_eq!(
            String::from_utf8(link.written()).unwrap(),
            "storage list -r /ext/subghz\r\nstorage list /ext/subghz\r\n"
        );
        assert_eq!(opener.attempts(), 1);
    }

    #[test]
    fn test_list_remote_uses_configured_window() {
        let opener = FakeOpener::new();
        let clock = ManualClock::new();
        let mut config = FlipperConfig::default();
        config.device.port = Some("/dev/ttyACM0".to_string());
        config.protocol.window_ms = 500;
        let connector = Connector::new(&config, opener.clone(), RecordingReclaimer::new(), clock.clone());

        let files = RemoteService::new(connector, config.remote).list_remote(None).unwrap();

        assert!(files.is_empty());
        assert!(clock.elapsed() >= Duration::from_secs(1));
        assert!(clock.elapsed() < Duration::from_millis(1200));
    }

    #[test]
    fn test_find_remote_accepts_extension() {
        let opener = FakeOpener::new();
        opener.link().push_reply(vec![Some(b"/ext/subghz/Win_stop.sub\r\n".to_vec())]);

        let found = service(&opener).find_remote("Win_stop.sub").unwrap();
        assert_eq!(found.map(|f| f.path), Some("/ext/subghz/Win_stop.sub".to_string()));
    }

    #[test]
    fn test_run_remote_silent_device_is_ok() {
        let opener = FakeOpener::new();
        let result = service(&opener)
            .run_remote("/ext/subghz/Win_stop.sub", 1, 0)
            .unwrap();

        assert_eq!(result, SUCCESS_MARKER);
        assert!(!opener.link().is_open());
    }

    #[test]
    fn test_run_remote_wraps_open_failure() {
        let opener = FakeOpener::new()
            .fail_next(serialport::ErrorKind::NoDevice)
            .fail_next(serialport::ErrorKind::NoDevice);

        let result = service(&opener).run_remote("/ext/subghz/Win_stop.sub", 1, 0);
        match result {
            Err(FlipperError::RunFailed { source }) => {
                assert!(matches!(*source, FlipperError::Connection { .. }))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_list_remote_wraps_transmit_failure() {
        let opener = FakeOpener::new();
        opener.link().fail_writes();

        let result = service(&opener).list_remote(None);
        assert!(matches!(result, Err(FlipperError::ListFailed { .. })));
    }
}
