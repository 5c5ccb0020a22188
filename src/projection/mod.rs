//! Extraction projector: turns a tree and a selection into the list of
//! files to materialize, with destination paths re-rooted under a prefix.
//!
//! A file is covered when its own path is selected or any ancestor
//! directory is. Covered files keep their position relative to the
//! shallowest selected ancestor directory; files covered only by their own
//! membership keep their full archive path. Selecting `src/components`
//! with prefix `dest` therefore yields `dest/Button.tsx`.

mod content_kind;

use serde::{Deserialize, Serialize};

pub use content_kind::{ContentKinds, DEFAULT_CONTENT_KIND};

use crate::selection::Selection;
use crate::tree::{ArchiveTree, NodeKind, TreeNode};

/// One file to extract. Byte payloads are fetched by `source_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFile {
    pub source_path: String,
    pub destination_path: String,
    pub size: u64,
    #[serde(rename = "inferredContentKind")]
    pub content_kind: String,
}

/// Counts shown next to a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Selected paths, directories included.
    pub entries: usize,
    /// Files that would be extracted.
    pub files: usize,
    pub bytes: u64,
}

impl SelectionSummary {
    pub fn new(selection: &Selection, files: &[ExtractedFile]) -> Self {
        Self {
            entries: selection.len(),
            files: files.len(),
            bytes: files.iter().map(|f| f.size).fold(0, u64::saturating_add),
        }
    }
}

/// Project the covered files of `tree` in traversal order.
///
/// An empty selection yields an empty list. Directories never produce
/// entries, so a selected empty directory contributes nothing.
pub fn project(
    tree: &ArchiveTree,
    selection: &Selection,
    destination_prefix: &str,
    kinds: &ContentKinds,
) -> Vec<ExtractedFile> {
    let mut out = Vec::new();
    if selection.is_empty() {
        return out;
    }
    let prefix = destination_prefix.trim_end_matches('/');
    collect(tree.root(), None, selection, prefix, kinds, &mut out);
    out
}

/// [`project`] with the built-in content kinds.
pub fn project_default(
    tree: &ArchiveTree,
    selection: &Selection,
    destination_prefix: &str,
) -> Vec<ExtractedFile> {
    project(tree, selection, destination_prefix, &ContentKinds::default())
}

fn collect<'a>(
    node: &'a TreeNode,
    anchor: Option<&'a str>,
    selection: &Selection,
    prefix: &str,
    kinds: &ContentKinds,
    out: &mut Vec<ExtractedFile>,
) {
    for child in &node.children {
        match child.kind {
            NodeKind::Directory { .. } => {
                let anchor = anchor.or_else(|| {
                    selection
                        .is_selected(&child.path)
                        .then_some(child.path.as_str())
                });
                collect(child, anchor, selection, prefix, kinds, out);
            }
            NodeKind::File { size } => {
                let relative = match anchor {
                    Some(dir) => &child.path[dir.len() + 1..],
                    None if selection.is_selected(&child.path) => child.path.as_str(),
                    None => continue,
                };
                out.push(ExtractedFile {
                    source_path: child.path.clone(),
                    destination_path: join(prefix, relative),
                    size,
                    content_kind: kinds.infer(&child.name).to_string(),
                });
            }
        }
    }
}

fn join(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Nodes whose own path is selected, in traversal order.
pub fn selected_nodes<'a>(tree: &'a ArchiveTree, selection: &Selection) -> Vec<&'a TreeNode> {
    tree.walk()
        .map(|(_, node)| node)
        .filter(|node| selection.is_selected(&node.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ArchiveEntryRecord;

    fn tree() -> ArchiveTree {
        ArchiveTree::build(vec![
            ArchiveEntryRecord::file(&["src", "components", "Card.tsx"], 3072),
            ArchiveEntryRecord::file(&["src", "components", "Button.tsx"], 2048),
            ArchiveEntryRecord::file(&["src", "utils", "helpers.ts"], 1024),
            ArchiveEntryRecord::file(&["src", "index.ts"], 512),
            ArchiveEntryRecord::file(&["public", "logo.svg"], 4096),
            ArchiveEntryRecord::directory(&["empty"]),
            ArchiveEntryRecord::file(&["package.json"], 1536),
            ArchiveEntryRecord::file(&["README.md"], 2560),
        ])
        .unwrap()
    }

    fn destinations(files: &[ExtractedFile]) -> Vec<&str> {
        files.iter().map(|f| f.destination_path.as_str()).collect()
    }

    #[test]
    fn selected_directory_is_re_rooted() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "src/components").unwrap();

        let files = project_default(&tree, &selection, "dest");
        assert_eq!(
            files,
            vec![
                ExtractedFile {
                    source_path: "src/components/Button.tsx".into(),
                    destination_path: "dest/Button.tsx".into(),
                    size: 2048,
                    content_kind: "text/typescript".into(),
                },
                ExtractedFile {
                    source_path: "src/components/Card.tsx".into(),
                    destination_path: "dest/Card.tsx".into(),
                    size: 3072,
                    content_kind: "text/typescript".into(),
                },
            ]
        );
    }

    #[test]
    fn nested_structure_is_kept_under_shallowest_anchor() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "src").unwrap();

        let files = project_default(&tree, &selection, "out/");
        assert_eq!(
            destinations(&files),
            vec![
                "out/components/Button.tsx",
                "out/components/Card.tsx",
                "out/utils/helpers.ts",
                "out/index.ts",
            ]
        );
    }

    #[test]
    fn directly_selected_files_keep_full_path() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "README.md").unwrap();
        selection.toggle(&tree, "src/utils/helpers.ts").unwrap();

        let files = project_default(&tree, &selection, "");
        assert_eq!(destinations(&files), vec!["src/utils/helpers.ts", "README.md"]);
        assert_eq!(files[1].content_kind, "text/markdown");
    }

    #[test]
    fn foreign_selection_uses_ancestor_coverage() {
        let tree = tree();
        // Directory restored without its cascade.
        let selection = Selection::from_paths(["src/components", "src/utils/helpers.ts"]);

        let files = project_default(&tree, &selection, "d");
        assert_eq!(
            destinations(&files),
            vec!["d/Button.tsx", "d/Card.tsx", "d/src/utils/helpers.ts"]
        );
    }

    #[test]
    fn deselected_child_of_selected_directory_is_still_covered() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "src/components").unwrap();
        selection.toggle(&tree, "src/components/Card.tsx").unwrap();
        assert!(selection.is_selected("src/components"));

        let files = project_default(&tree, &selection, "");
        assert_eq!(destinations(&files), vec!["Button.tsx", "Card.tsx"]);
    }

    #[test]
    fn stale_and_unknown_paths_are_ignored() {
        let tree = tree();
        let selection = Selection::from_paths(["gone/file.txt", "src-other"]);
        assert!(project_default(&tree, &selection, "").is_empty());
    }

    #[test]
    fn empty_selection_and_empty_directory() {
        let tree = tree();
        assert!(project_default(&tree, &Selection::new(), "dest").is_empty());

        let mut selection = Selection::new();
        selection.toggle(&tree, "empty").unwrap();
        assert!(project_default(&tree, &selection, "dest").is_empty());
    }

    #[test]
    fn custom_kinds_and_summary() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "public").unwrap();
        selection.toggle(&tree, "package.json").unwrap();

        let kinds = ContentKinds::empty().with_override("svg", "image/x-icon");
        let files = project(&tree, &selection, "", &kinds);
        assert_eq!(files[0].destination_path, "logo.svg");
        assert_eq!(files[0].content_kind, "image/x-icon");
        assert_eq!(files[1].content_kind, DEFAULT_CONTENT_KIND);

        let summary = SelectionSummary::new(&selection, &files);
        assert_eq!(
            summary,
            SelectionSummary {
                entries: 3,
                files: 2,
                bytes: 5632
            }
        );
    }

    #[test]
    fn summary_bytes_saturate() {
        let tree = ArchiveTree::build(vec![
            ArchiveEntryRecord::file(&["big", "a.bin"], 1 << 63),
            ArchiveEntryRecord::file(&["big", "b.bin"], 1 << 63),
        ])
        .unwrap();
        let mut selection = Selection::new();
        selection.toggle(&tree, "big").unwrap();

        let files = project_default(&tree, &selection, "");
        assert_eq!(SelectionSummary::new(&selection, &files).bytes, u64::MAX);
        assert_eq!(tree.total_size(), u64::MAX);
    }

    #[test]
    fn selected_nodes_in_walk_order() {
        let tree = tree();
        let mut selection = Selection::new();
        selection.toggle(&tree, "README.md").unwrap();
        selection.toggle(&tree, "public").unwrap();

        let paths: Vec<_> = selected_nodes(&tree, &selection)
            .into_iter()
            .map(|n| n.path.as_str())
            .collect();
        assert_eq!(paths, vec!["public", "public/logo.svg", "README.md"]);
    }

    #[test]
    fn serializes_with_boundary_names() {
        let file = ExtractedFile {
            source_path: "a/b.json".into(),
            destination_path: "b.json".into(),
            size: 3,
            content_kind: "application/json".into(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sourcePath": "a/b.json",
                "destinationPath": "b.json",
                "size": 3,
                "inferredContentKind": "application/json",
            })
        );
    }
}
