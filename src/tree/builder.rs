//! Depth-first traversal of a remote directory

use log::{debug, warn};

use crate::error::{FtpClientError, Result};
use crate::tree::entry::{LineParser, ListingNode, ListingTree, UnixLineParser};

/// Anything that can produce the raw listing text of a remote path
pub trait DirectoryLister {
    fn list(&mut self, path: &str) -> Result<String>;
}

/// Builds a [`ListingTree`] with pre-order depth-first traversal
///
/// Cycles (e.g. through symbolic links) are not detected.
#[derive(Debug, Default)]
pub struct TreeBuilder<P = UnixLineParser> {
    parser: P,
}

impl<P: LineParser> TreeBuilder<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// List `root` recursively; any listing failure discards everything
    pub fn build<L>(&self, lister: &mut L, root: &str) -> Result<ListingTree>
    where
        L: DirectoryLister + ?Sized,
    {
        let entries = self.build_level(lister, root, 0).inspect_err(|e| {
            warn!("Recursive listing of '{}' aborted: {}", root, e);
        })?;
        Ok(ListingTree { entries })
    }

    fn build_level<L>(&self, lister: &mut L, path: &str, depth: usize) -> Result<Vec<ListingNode>>
    where
        L: DirectoryLister + ?Sized,
    {
        debug!("Listing '{}' at depth {}", path, depth);
        let raw = lister.list(path)?;

        let mut nodes = Vec::new();
        for line in raw.split('\n') {
            let Some(entry) = self.parser.parse_line(line) else {
                continue;
            };
            if entry.name == "." || entry.name == ".." {
                continue;
            }

            let children = if entry.is_directory {
                let child_path = format!("{}/{}", path.trim_end_matches('/'), entry.name);
                self.build_level(lister, &child_path, depth + 1)?
            } else {
                Vec::new()
            };
            nodes.push(ListingNode { entry, children });
        }
        Ok(nodes)
    }
}

/// RNLS takes exactly one path token
pub fn single_path_argument(argument: &str) -> Result<&str> {
    let mut tokens = argument.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(path), None) => Ok(path),
        _ => Err(FtpClientError::InvalidArgument(
            "wrong argument format: RNLS <path>".to_string(),
        )),
    }
}
