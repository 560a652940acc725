use thiserror::Error;

/// Flipper Remote unified error type
#[derive(Error, Debug)]
pub enum FlipperError {
    #[error("Flipper serial port not found (searched: {searched})")]
    DeviceNotFound { searched: String },

    #[error("Failed to open serial port {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to exchange command '{command}': {source}")]
    Transmit {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error listing device scripts: {source}")]
    ListFailed {
        #[source]
        source: Box<FlipperError>,
    },

    #[error("Error running device script: {source}")]
    RunFailed {
        #[source]
        source: Box<FlipperError>,
    },

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl FlipperError {
    /// Wrap a failure from the listing path into the single error callers see.
    pub fn list_failed(source: FlipperError) -> Self {
        Self::ListFailed {
            source: Box::new(source),
        }
    }

    /// Wrap a failure from the transmit path into the single error callers see.
    pub fn run_failed(source: FlipperError) -> Self {
        Self::RunFailed {
            source: Box::new(source),
        }
    }
}

pub type FlipperResult<T> = Result<T, FlipperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_run_failed_keeps_source_chain() {
        let inner = FlipperError::DeviceNotFound {
            searched: "/dev/ttyACM*".to_string(),
        };
        let err = FlipperError::run_failed(inner);

        assert!(err.to_string().starts_with("Error running device script"));
        let source = err.source().expect("wrapped source");
        assert!(source.to_string().contains("/dev/ttyACM*"));
    }

    #[test]
    fn test_transmit_display_names_command() {
        let err = FlipperError::Transmit {
            command: "storage list /ext/subghz".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        let display = err.to_string();
        assert!(display.contains("storage list /ext/subghz"));
        assert!(display.contains("pipe closed"));
    }
}
