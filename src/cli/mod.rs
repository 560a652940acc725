// CLI module - flipper-remote command line surface
pub mod args;
pub mod commands;
pub mod output;

pub use args::{Args, Command, OutputFormat, MAX_DEVICE, MAX_REPEAT};
pub use commands::execute_command;
pub use output::{ConsoleWriter, OutputWriter};
