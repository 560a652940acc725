//! Flipper Remote Library
//!
//! Serial session layer for a Flipper Zero: endpoint discovery, recovery of a
//! port held by other programs, and command/response exchange over the
//! device's text console.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod testing;

pub use crate::domain::error::{FlipperError, FlipperResult};
pub use crate::domain::config::FlipperConfig;
pub use crate::core::communication::{Command, NoiseFilter, Response, ResponseMode};
pub use crate::core::remote::{RemoteFile, RemoteService};
pub use crate::core::session::{Clock, Connector, DeviceSession, SessionState, SystemClock};
pub use crate::infrastructure::serial::{Endpoint, PortReclaimer, PortResolver};
