use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Line terminator expected by the Flipper CLI
pub const LINE_TERMINATOR: &str = "\r\n";

/// How a filtered response is handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Only the final meaningful line (a status or result token)
    LastLine,
    /// The whole filtered sequence (listings, multi-line output)
    AllLines,
}

/// How long output is collected after a command is written.
///
/// `Standard` and `Transmit` are resolved by the session from its protocol
/// settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionWindow {
    Standard,
    Transmit,
    Fixed(Duration),
}

/// A single command line plus its collection window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub text: String,
    pub window: CollectionWindow,
    pub mode: ResponseMode,
}

impl Command {
    /// General command with the standard window in last-line mode
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            window: CollectionWindow::Standard,
            mode: ResponseMode::LastLine,
        }
    }

    /// `subghz tx_from_file <path> <repeat> <device>`
    ///
    /// The device takes longer to run and acknowledge a transmission, so this
    /// uses the transmit window. Repeat and device index are sent as given.
    pub fn transmit_from_file(path: &str, repeat: u32, device: u32) -> Self {
        Self {
            text: format!("subghz tx_from_file {} {} {}", path, repeat, device),
            window: CollectionWindow::Transmit,
            mode: ResponseMode::LastLine,
        }
    }

    /// `storage list [-r] <directory>`
    pub fn storage_list(directory: &str, recursive: bool) -> Self {
        let text = if recursive {
            format!("storage list -r {}", directory)
        } else {
            format!("storage list {}", directory)
        };
        Self::new(text).all_lines()
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = CollectionWindow::Fixed(window);
        self
    }

    pub fn all_lines(mut self) -> Self {
        self.mode = ResponseMode::AllLines;
        self
    }

    /// Bytes put on the wire for this command
    pub fn to_wire(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.text.len() + LINE_TERMINATOR.len());
        data.extend_from_slice(self.text.as_bytes());
        data.extend_from_slice(LINE_TERMINATOR.as_bytes());
        data
    }
}

/// Filtered lines produced by the device during one collection window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub lines: Vec<String>,
}

impl Response {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Final line, or an empty string when nothing survived filtering
    pub fn last_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Shape the response according to `mode`
    pub fn render(&self, mode: ResponseMode) -> Vec<String> {
        match mode {
            ResponseMode::LastLine => vec![self.last_line().to_string()],
            ResponseMode::AllLines => self.lines.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_appends_crlf() {
        let command = Command::new("device_info");
        assert_eq!(command.to_wire(), b"device_info\r\n".to_vec());
    }

    #[test]
    fn test_transmit_command_shape() {
        let command = Command::transmit_from_file("/ext/subghz/Win_stop.sub", 1, 0);
        assert_eq!(command.text, "subghz tx_from_file /ext/subghz/Win_stop.sub 1 0");
        assert_eq!(command.window, CollectionWindow::Transmit);
        assert_eq!(command.mode, ResponseMode::LastLine);
    }

    #[test]
    fn test_storage_list_commands() {
        let recursive = Command::storage_list("/ext/subghz", true);
        assert_eq!(recursive.text, "storage list -r /ext/subghz");
        assert_eq!(recursive.mode, ResponseMode::AllLines);
        assert_eq!(recursive.window, CollectionWindow::Standard);

        let flat = Command::storage_list("/ext/subghz", false);
        assert_eq!(flat.text, "storage list /ext/subghz");
    }

    #[test]
    fn test_explicit_window_is_fixed() {
        let command = Command::new("led r 0").with_window(Duration::from_millis(200));
        assert_eq!(command.window, CollectionWindow::Fixed(Duration::from_millis(200)));
    }

    #[test]
    fn test_render_follows_mode() {
        let response = Response::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(response.render(ResponseMode::LastLine), vec!["b".to_string()]);
        assert_eq!(response.render(ResponseMode::AllLines), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_last_line_of_empty_response() {
        let response = Response::default();
        assert_eq!(response.last_line(), "");
        assert_eq!(response.render(ResponseMode::LastLine), vec![String::new()]);
        assert!(response.render(ResponseMode::AllLines).is_empty());
    }
}
