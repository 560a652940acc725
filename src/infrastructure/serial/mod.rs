// Serial module - Endpoint discovery, port recovery and the serialport link
pub mod client;
pub mod port;

pub use client::{LinkSettings, NativeOpener, PortOpener, SerialLink, SerialPortLink};
pub use port::{Endpoint, EndpointSource, PortReclaimer, PortResolver, ProcessReclaimer};
