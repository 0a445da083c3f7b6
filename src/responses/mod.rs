//! FTP reply parsing module

pub mod parser;
pub mod status_codes;

// Re-export main types
pub use parser::{FtpResponse, parse_response, reply_code};
pub use status_codes::*;
