// Session module - Device session lifecycle and command exchange
pub mod clock;
pub mod connector;
pub mod session;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use connector::{Connector, SessionOf};
pub use session::DeviceSession;
pub use state::{SessionState, SessionSummary};
