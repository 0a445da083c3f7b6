//! Listing entries and the rendered tree

use std::fmt;

/// Indentation added per depth level
pub const SPACER: &str = "   ";
/// Marker for every entry but the last one of a level
pub const BRANCH: &str = "├──";
/// Marker for the last entry of a level
pub const LAST_BRANCH: &str = "└──";

/// One parsed line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub is_directory: bool,
    pub name: String,
}

/// Turns one raw listing line into an entry
///
/// Returns `None` for lines that carry no entry (blank lines).
pub trait LineParser {
    fn parse_line(&self, raw_line: &str) -> Option<ListingEntry>;
}

/// Parser for `ls -l` style listings (`drwxr-xr-x 2 user group 4096 Jan 1 00:00 name`)
///
/// A line is a directory iff it starts with `d`; the name is the last
/// space-separated field, so names containing spaces are cut to their last word.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixLineParser;

impl LineParser for UnixLineParser {
    fn parse_line(&self, raw_line: &str) -> Option<ListingEntry> {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line).trim();
        if line.is_empty() {
            return None;
        }

        let name = line.split(' ').next_back()?.to_string();
        Some(ListingEntry {
            is_directory: line.starts_with('d'),
            name,
        })
    }
}

/// An entry together with its children (empty for files)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingNode {
    pub entry: ListingEntry,
    pub children: Vec<ListingNode>,
}

/// Recursive listing rooted at the requested path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingTree {
    pub entries: Vec<ListingNode>,
}

impl ListingTree {
    /// Render one entry per line, indented by depth
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_level(&self.entries, 0, &mut out);
        out
    }
}

fn render_level(nodes: &[ListingNode], depth: usize, out: &mut String) {
    for (index, node) in nodes.iter().enumerate() {
        let marker = if index + 1 == nodes.len() {
            LAST_BRANCH
        } else {
            BRANCH
        };
        out.push_str(&SPACER.repeat(depth));
        out.push_str(marker);
        out.push_str(&node.entry.name);
        out.push('\n');
        render_level(&node.children, depth + 1, out);
    }
}

impl fmt::Display for ListingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
