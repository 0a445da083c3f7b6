//! Console commands
//!
//! Parses console lines and routes them to session capabilities by verb.

pub mod help;
pub mod parser;
pub mod registry;

// Re-export the main types for easier importing
pub use help::get_help_text;
pub use parser::Command;
pub use registry::{CommandRegistry, DispatchResult, session_registry};
