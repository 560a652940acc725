use std::fs;
use std::process::Command;
use std::str;
use tempfile::TempDir;

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    fn flipper_remote() -> Command {
        Command::new(env!("CARGO_BIN_EXE_flipper-remote"))
    }

    /// Config whose endpoint search can never match anything
    fn isolated_config(temp: &TempDir) -> String {
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            format!(
                "[device]\nby_id_dir = \"{0}/by-id\"\nacm_pattern = \"{0}/ttyACM*\"\n",
                temp.path().display()
            ),
        )
        .unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_cli_help() {
        let output = flipper_remote()
            .arg("--help")
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains("Usage:"));
        assert!(stdout.contains("Commands:"));
        for command in ["detect", "free", "send", "list", "run", "config"] {
            assert!(stdout.contains(command), "help lacks '{}'", command);
        }
    }

    #[test]
    fn test_cli_run_help() {
        let output = flipper_remote()
            .args(["run", "--help"])
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(stdout.contains("--repeat"));
        assert!(stdout.contains("--device"));
    }

    #[test]
    fn test_cli_version() {
        let output = flipper_remote()
            .args(["-q", "version"])
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(output.status.success());
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cli_invalid_command() {
        let output = flipper_remote()
            .arg("invalid-command")
            .output()
            .expect("Failed to execute command");

        assert!(!output.status.success());
    }

    #[test]
    fn test_cli_rejects_out_of_range_repeat() {
        for args in [
            ["run", "Win_stop", "--repeat", "0"],
            ["run", "Win_stop", "--repeat", "101"],
            ["run", "Win_stop", "--device", "4"],
        ] {
            let output = flipper_remote()
                .args(args)
                .output()
                .expect("Failed to execute command");

            assert!(!output.status.success(), "{:?} should be rejected", args);
            let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");
            assert!(stderr.contains("invalid value"));
        }
    }

    #[test]
    fn test_cli_detect_explicit_port() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(&temp);

        let output = flipper_remote()
            .args(["-q", "--config", &config, "--port", "/dev/ttyACM9", "detect"])
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(output.status.success());
        assert_eq!(stdout.trim(), "/dev/ttyACM9");
    }

    #[test]
    fn test_cli_detect_json() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(&temp);

        let output = flipper_remote()
            .args(["-q", "-o", "json", "--config", &config, "-p", "/dev/ttyACM9", "detect"])
            .output()
            .expect("Failed to execute command");

        let value: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("detect output is JSON");
        assert_eq!(value["path"], "/dev/ttyACM9");
        assert_eq!(value["source"], "Explicit");
    }

    #[test]
    fn test_cli_detect_without_device_fails() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(&temp);

        let output = flipper_remote()
            .args(["-q", "--config", &config, "detect"])
            .output()
            .expect("Failed to execute command");

        assert!(!output.status.success());
        let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");
        assert!(stderr.contains("not found"));
    }

    #[test]
    fn test_cli_json_error_report() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(&temp);

        let output = flipper_remote()
            .args(["-q", "-o", "json", "--config", &config, "detect"])
            .output()
            .expect("Failed to execute command");

        assert!(!output.status.success());
        let value: serde_json::Value =
            serde_json::from_slice(&output.stderr).expect("error report is JSON");
        assert_eq!(value["level"], "error");
        assert!(value["error"].as_str().unwrap().contains("not found"));
    }

    #[test]
    fn test_cli_config_show() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(&temp);

        let output = flipper_remote()
            .args(["-q", "--config", &config, "config", "show"])
            .output()
            .expect("Failed to execute command");

        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");
        assert!(output.status.success());
        assert!(stdout.contains("baud_rate = 230400"));
        assert!(stdout.contains("/ext/subghz"));
    }
}
