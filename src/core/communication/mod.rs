// Communication module - Command/response framing
pub mod filter;
pub mod message;

pub use filter::NoiseFilter;
pub use message::{CollectionWindow, Command, Response, ResponseMode, LINE_TERMINATOR};
