use serde::{Deserialize, Serialize};

/// Lifecycle of a device session: `Closed -> Open -> Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Closed,
    Open,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Closed => write!(f, "Closed"),
            SessionState::Open => write!(f, "Open"),
        }
    }
}

/// Snapshot of a session for logs and CLI output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub endpoint: String,
    pub baud_rate: u32,
    pub state: SessionState,
    pub exchanges: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Open.to_string(), "Open");
        assert_eq!(SessionState::Closed.to_string(), "Closed");
    }
}
