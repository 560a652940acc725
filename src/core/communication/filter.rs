use crate::core::communication::message::Response;
use crate::domain::config::ProtocolConfig;

/// Drops banner, help hint, firmware banner and prompt lines from console output.
///
/// Matching is a literal prefix test against the trimmed line, so a prompt
/// echoing the command (`>: storage list ...`) is dropped as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFilter {
    prefixes: Vec<String>,
}

impl NoiseFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(config.noise_prefixes.iter().cloned())
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
    }

    /// Split decoded console text into the meaningful lines
    pub fn apply(&self, text: &str) -> Response {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.is_noise(line))
            .map(str::to_string)
            .collect();
        Response::new(lines)
    }

    /// Lossy decode followed by [`NoiseFilter::apply`]
    pub fn apply_bytes(&self, data: &[u8]) -> Response {
        self.apply(&String::from_utf8_lossy(data))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::from_config(&ProtocolConfig::default())
    }
}
