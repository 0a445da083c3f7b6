//! Recursive remote listing (RNLS)
//!
//! Builds an indented tree of a remote directory from repeated LIST calls.

pub mod builder;
pub mod entry;

pub use builder::{DirectoryLister, TreeBuilder, single_path_argument};
pub use entry::UnixLineParser;
