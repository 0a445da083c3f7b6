//! Terminal module for the FTP console
//!
//! Interactive input handling and the worker that serializes session access.

pub mod console;
pub mod worker;

// Re-export commonly used items
pub use console::Console;
