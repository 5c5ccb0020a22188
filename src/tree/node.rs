use std::cmp::Ordering;

/// Kind of a tree node. Size lives on files only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File { size: u64 },
    /// `inferred` is set when no explicit directory record existed and the
    /// directory was materialized from a descendant's path.
    Directory { inferred: bool },
}

/// A file or directory in a built archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            kind: NodeKind::Directory { inferred: false },
            children: Vec::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn is_inferred(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { inferred: true })
    }

    /// Size of a file node, `None` for directories.
    pub fn size(&self) -> Option<u64> {
        match self.kind {
            NodeKind::File { size } => Some(size),
            NodeKind::Directory { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first pre-order walk over every descendant (not `self`).
    ///
    /// Yields `(depth, node)` with depth 0 for direct children.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.children.iter()],
        }
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File { .. } => 1,
            NodeKind::Directory { .. } => self.walk().filter(|(_, n)| n.is_file()).count(),
        }
    }

    /// Sum of file sizes in this subtree, saturating at `u64::MAX`.
    pub fn total_size(&self) -> u64 {
        match self.kind {
            NodeKind::File { size } => size,
            NodeKind::Directory { .. } => self
                .walk()
                .filter_map(|(_, n)| n.size())
                .fold(0, u64::saturating_add),
        }
    }

    /// Directories before files, then by name.
    pub(crate) fn display_order(a: &TreeNode, b: &TreeNode) -> Ordering {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    }

    pub(crate) fn sort_recursive(&mut self) {
        self.children.sort_by(Self::display_order);
        for child in &mut self.children {
            child.sort_recursive();
        }
    }
}

/// Iterator returned by [`TreeNode::walk`].
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, TreeNode>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let next = self.stack[depth].next();
            match next {
                Some(node) => {
                    if !node.children.is_empty() {
                        self.stack.push(node.children.iter());
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
