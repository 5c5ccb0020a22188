//! Plain-text views of a tree and its selection for the CLI.

use std::fmt::Write;

use crate::selection::Selection;
use crate::tree::{ArchiveTree, TreeNode};

/// Format a byte size into a human-readable string.
///
/// ```
/// assert_eq!(ziptree::render::format_size(500), "500 bytes");
/// assert_eq!(ziptree::render::format_size(1536), "1.50 KB");
/// assert_eq!(ziptree::render::format_size(1048576), "1.00 MB");
/// ```
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Selection marker for one row.
///
/// `[x]` the path itself is selected, `[~]` it is covered through a
/// selected ancestor directory, `[ ]` otherwise.
fn marker(node: &TreeNode, selection: &Selection, covered: bool) -> &'static str {
    if selection.is_selected(&node.path) {
        "[x]"
    } else if covered {
        "[~]"
    } else {
        "[ ]"
    }
}

/// Indented tree with selection markers, directories suffixed with `/`
/// and files followed by their size.
pub fn render_tree(tree: &ArchiveTree, selection: &Selection) -> String {
    let mut out = String::new();
    render_children(tree.root(), selection, false, 0, &mut out);
    out
}

fn render_children(
    node: &TreeNode,
    selection: &Selection,
    covered: bool,
    depth: usize,
    out: &mut String,
) {
    for child in &node.children {
        let mark = marker(child, selection, covered);
        let indent = "    ".repeat(depth);
        match child.size() {
            Some(size) => {
                let _ = writeln!(out, "{mark} {indent}{}  ({})", child.name, format_size(size));
            }
            None => {
                let _ = writeln!(out, "{mark} {indent}{}/", child.name);
                let covered = covered || selection.is_selected(&child.path);
                render_children(child, selection, covered, depth + 1, out);
            }
        }
    }
}
