// Core module - Device session protocol and remote file operations
pub mod communication;
pub mod remote;
pub mod session;
