use tracing::info;

use crate::error::Result;
use crate::projection::{self, ContentKinds, ExtractedFile, SelectionSummary};
use crate::selection::{Selection, Toggled};
use crate::tree::{ArchiveEntryRecord, ArchiveTree, TreeNode};

/// One archive being browsed: its tree and the caller's selection over it.
///
/// The session is the single writer for its selection. Hosts that share a
/// session between tasks must serialize access themselves; the tree can be
/// cloned out and read concurrently.
#[derive(Debug, Clone)]
pub struct BrowseSession {
    tree: ArchiveTree,
    selection: Selection,
    kinds: ContentKinds,
}

impl BrowseSession {
    pub fn open(records: impl IntoIterator<Item = ArchiveEntryRecord>) -> Result<Self> {
        let tree = ArchiveTree::build(records)?;
        info!(
            entries = tree.len(),
            files = tree.file_count(),
            "opened archive session"
        );
        Ok(Self {
            tree,
            selection: Selection::new(),
            kinds: ContentKinds::default(),
        })
    }

    pub fn with_content_kinds(mut self, kinds: ContentKinds) -> Self {
        self.kinds = kinds;
        self
    }

    /// Replace the archive and reset the selection.
    ///
    /// On error the session keeps its current tree and selection.
    pub fn load(&mut self, records: impl IntoIterator<Item = ArchiveEntryRecord>) -> Result<()> {
        let tree = ArchiveTree::build(records)?;
        self.tree = tree;
        self.selection.clear();
        Ok(())
    }

    pub fn tree(&self) -> &ArchiveTree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> (&ArchiveTree, &mut Selection) {
        (&self.tree, &mut self.selection)
    }

    /// Swap in a persisted selection as-is.
    pub fn restore(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn toggle(&mut self, path: &str) -> Result<Toggled> {
        self.selection.toggle(&self.tree, path)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selection.is_selected(path)
    }

    pub fn extract(&self, destination_prefix: &str) -> Vec<ExtractedFile> {
        projection::project(&self.tree, &self.selection, destination_prefix, &self.kinds)
    }

    pub fn selected_entries(&self) -> Vec<&TreeNode> {
        projection::selected_nodes(&self.tree, &self.selection)
    }

    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary::new(&self.selection, &self.extract(""))
    }
}
