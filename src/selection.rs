//! Selection engine: a set of selected entry paths with cascading toggles.
//!
//! Selecting a directory adds the directory and its whole subtree.
//! Deselecting a directory removes it and every selected path below it,
//! matched on the `path/` prefix so `src` never touches `src-backup`.
//! Files are tracked on their own: toggling a file never changes an
//! ancestor's membership.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::tree::ArchiveTree;

/// Result of a single [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// The path was added; `added` counts it plus any newly added descendants.
    Selected { added: usize },
    /// The path was removed; `removed` counts it plus any removed descendants.
    Deselected { removed: usize },
}

/// Paths currently selected in one browsing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Selection {
    paths: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a selection from persisted or foreign state.
    ///
    /// Paths are taken as-is; nothing is cascaded or checked against a tree.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Selected paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.iter().collect();
        paths.sort_unstable();
        paths
    }

    /// Flip the membership of `path`, cascading for directories.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPath`] if `path` is not an entry of `tree`; the
    /// selection is left unchanged.
    pub fn toggle(&mut self, tree: &ArchiveTree, path: &str) -> Result<Toggled> {
        let node = tree.get(path).ok_or_else(|| Error::UnknownPath {
            path: path.to_string(),
        })?;

        let outcome = if self.paths.remove(path) {
            let mut removed = 1;
            if node.is_dir() {
                let prefix = format!("{path}/");
                let before = self.paths.len();
                self.paths.retain(|p| !p.starts_with(&prefix));
                removed += before - self.paths.len();
            }
            Toggled::Deselected { removed }
        } else {
            self.paths.insert(path.to_string());
            let mut added = 1;
            for (_, descendant) in node.walk() {
                if self.paths.insert(descendant.path.clone()) {
                    added += 1;
                }
            }
            Toggled::Selected { added }
        };

        trace!(path, ?outcome, total = self.paths.len(), "toggled selection");
        Ok(outcome)
    }

    /// Make sure `path` is selected, toggling only if it is not.
    pub fn ensure_selected(&mut self, tree: &ArchiveTree, path: &str) -> Result<Option<Toggled>> {
        if self.is_selected(path) {
            if tree.contains(path) {
                return Ok(None);
            }
            return Err(Error::UnknownPath {
                path: path.to_string(),
            });
        }
        self.toggle(tree, path).map(Some)
    }

    /// Make sure `path` is not selected, toggling only if it is.
    pub fn ensure_deselected(&mut self, tree: &ArchiveTree, path: &str) -> Result<Option<Toggled>> {
        if !self.is_selected(path) {
            if tree.contains(path) {
                return Ok(None);
            }
            return Err(Error::UnknownPath {
                path: path.to_string(),
            });
        }
        self.toggle(tree, path).map(Some)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

impl From<Vec<String>> for Selection {
    fn from(paths: Vec<String>) -> Self {
        Self::from_paths(paths)
    }
}

impl From<Selection> for Vec<String> {
    fn from(selection: Selection) -> Self {
        let mut paths: Vec<_> = selection.paths.into_iter().collect();
        paths.sort_unstable();
        paths
    }
}
