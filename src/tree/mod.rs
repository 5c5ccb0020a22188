//! In-memory directory tree built from a flat archive entry list.
//!
//! The tree is immutable once built. Every node is addressed by its
//! canonical `/`-joined path; the synthetic root has the empty path and is
//! never returned by [`ArchiveTree::get`].

mod builder;
mod node;
mod record;

use std::collections::HashMap;

pub use node::{NodeKind, TreeNode, Walk};
pub use record::ArchiveEntryRecord;

use crate::error::Result;

/// A built archive tree plus a path index for O(depth) lookups.
#[derive(Debug, Clone)]
pub struct ArchiveTree {
    root: TreeNode,
    /// Child index at each level from the root down to the node.
    routes: HashMap<String, Vec<usize>>,
}

impl ArchiveTree {
    /// Build a tree from archive entry records.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`](crate::Error::InvalidPath) for empty or malformed
    /// paths and duplicate files, [`Error::PathKindConflict`](crate::Error::PathKindConflict)
    /// when a path is both a file and a directory. No partial tree is returned.
    pub fn build(records: impl IntoIterator<Item = ArchiveEntryRecord>) -> Result<Self> {
        let root = builder::build_root(records)?;
        let mut routes = HashMap::new();
        index(&root, &mut Vec::new(), &mut routes);
        Ok(Self { root, routes })
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Resolve an entry by path. The root itself is not an entry.
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        let route = self.routes.get(path)?;
        let mut node = &self.root;
        for &i in route {
            node = &node.children[i];
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Every entry in depth-first order, directories before files at each level.
    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    /// Number of entries, files and directories, excluding the root.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.root.file_count()
    }

    pub fn total_size(&self) -> u64 {
        self.root.total_size()
    }
}

fn index(node: &TreeNode, route: &mut Vec<usize>, routes: &mut HashMap<String, Vec<usize>>) {
    for (i, child) in node.children.iter().enumerate() {
        route.push(i);
        routes.insert(child.path.clone(), route.clone());
        index(child, route, routes);
        route.pop();
    }
}
