use flipper_remote::{FlipperError, FlipperResult};
use std::error::Error;
use std::io;

/// Error handling and resilience tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    fn busy() -> serialport::Error {
        serialport::Error::new(serialport::ErrorKind::NoDevice, "Device or resource busy")
    }

    #[test]
    fn test_error_types() {
        let errors = vec![
            FlipperError::DeviceNotFound {
                searched: "/dev/serial/by-id/*Flipper*if00, /dev/ttyACM*".to_string(),
            },
            FlipperError::Connection {
                endpoint: "/dev/ttyACM0".to_string(),
                source: busy(),
            },
            FlipperError::Transmit {
                command: "device_info".to_string(),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"),
            },
            FlipperError::ScriptNotFound("Win_stop".to_string()),
            FlipperError::Config {
                message: "bad toml".to_string(),
            },
            FlipperError::InvalidInput("Invalid input".to_string()),
            FlipperError::Output("Output error".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty(), "Error display should not be empty");
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlipperError>();
    }

    #[test]
    fn test_error_messages_name_the_subject() {
        let error = FlipperError::Connection {
            endpoint: "/dev/ttyACM0".to_string(),
            source: busy(),
        };
        assert!(error.to_string().contains("/dev/ttyACM0"));
        assert!(error.to_string().contains("busy"));

        let error = FlipperError::ScriptNotFound("Win_stop".to_string());
        assert_eq!(error.to_string(), "Script not found: Win_stop");
    }

    #[test]
    fn test_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let flipper_error: FlipperError = io_error.into();
        assert!(matches!(flipper_error, FlipperError::Io(_)));

        let flipper_error: FlipperError = busy().into();
        assert!(matches!(flipper_error, FlipperError::Serial(_)));
    }

    #[test]
    fn test_wrapped_failures_keep_their_cause() {
        let run = FlipperError::run_failed(FlipperError::Connection {
            endpoint: "/dev/ttyACM0".to_string(),
            source: busy(),
        });

        assert!(run.to_string().starts_with("Error running device script"));
        let cause = run.source().expect("run failure has a cause");
        assert!(cause.to_string().contains("/dev/ttyACM0"));
        let root = cause.source().expect("connection failure has a cause");
        assert!(root.to_string().contains("busy"));

        let list = FlipperError::list_failed(FlipperError::Transmit {
            command: "storage list /ext/subghz".to_string(),
            source: io::Error::new(io::ErrorKind::TimedOut, "write timed out"),
        });
        assert!(list.to_string().starts_with("Error listing device scripts"));
        assert!(list.source().is_some());
    }

    #[test]
    fn test_result_type() {
        fn success_function() -> FlipperResult<String> {
            Ok("OK".to_string())
        }

        fn error_function() -> FlipperResult<String> {
            Err(FlipperError::InvalidInput("repeat must be at least 1".to_string()))
        }

        fn chained() -> FlipperResult<String> {
            let value = success_function()?;
            let _ = error_function()?;
            Ok(value)
        }

        assert_eq!(success_function().unwrap(), "OK");
        assert!(matches!(chained(), Err(FlipperError::InvalidInput(_))));
    }

    #[test]
    fn test_error_size() {
        // Errors travel through every Result in the session path
        assert!(std::mem::size_of::<FlipperError>() <= 128);
    }
}
