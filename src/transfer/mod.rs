//! Data-phase byte copying for FTP transfers

pub mod download;
pub mod listing;
pub mod progress;
pub mod upload;

// Re-export main functions
pub use download::download_exact;
pub use listing::read_directory_listing;
pub use upload::{upload_file, validate_upload_file};
