//! Connection management for the FTP console
//!
//! Handles both the control channel and passive data connections.

pub mod command;
pub mod data;

// Re-export main types
pub use command::ControlChannel;
pub use data::{DataConnection, parse_pasv_reply};
