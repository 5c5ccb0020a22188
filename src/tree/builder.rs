use std::collections::HashMap;

use tracing::debug;

use super::node::{NodeKind, TreeNode};
use super::record::ArchiveEntryRecord;
use crate::error::{Error, Result};

/// Node under construction. Children are keyed by name so lookups stay
/// cheap for wide directories; ordering is applied once at the end.
struct Pending {
    kind: NodeKind,
    children: HashMap<String, Pending>,
}

impl Pending {
    fn directory(inferred: bool) -> Self {
        Self {
            kind: NodeKind::Directory { inferred },
            children: HashMap::new(),
        }
    }

    fn file(size: u64) -> Self {
        Self {
            kind: NodeKind::File { size },
            children: HashMap::new(),
        }
    }

    fn into_node(self, name: String, parent: &str) -> TreeNode {
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{parent}/{name}")
        };
        let children = self
            .children
            .into_iter()
            .map(|(child, pending)| pending.into_node(child, &path))
            .collect();
        TreeNode {
            name,
            path,
            kind: self.kind,
            children,
        }
    }
}

/// Reject paths that are empty or could point outside their own position.
fn validate(record: &ArchiveEntryRecord) -> Result<()> {
    if record.path.is_empty() {
        return Err(Error::invalid(record.joined(), "empty path"));
    }
    for segment in &record.path {
        let reason = match segment.as_str() {
            "" => Some("empty segment"),
            "." | ".." => Some("relative segment"),
            s if s.contains('/') || s.contains('\\') => Some("separator inside segment"),
            s if s.contains('\0') => Some("null byte"),
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(Error::invalid(record.joined(), reason));
        }
    }
    Ok(())
}

/// Build the ordered tree for a flat record list.
///
/// Records are processed shortest path first so explicit directory records
/// are attached before anything below them. Missing ancestors are created as
/// inferred directories. The whole call fails on the first bad record.
pub(crate) fn build_root(records: impl IntoIterator<Item = ArchiveEntryRecord>) -> Result<TreeNode> {
    let mut records: Vec<_> = records.into_iter().collect();
    for record in &records {
        validate(record)?;
    }
    records.sort_by_key(|r| r.path.len());

    let mut root = Pending::directory(false);
    let mut inferred = 0usize;

    for record in &records {
        let (last, parents) = match record.path.split_last() {
            Some(split) => split,
            None => return Err(Error::invalid(String::new(), "empty path")),
        };

        let mut current = &mut root;
        for (depth, segment) in parents.iter().enumerate() {
            let next = current.children.entry(segment.clone()).or_insert_with(|| {
                inferred += 1;
                Pending::directory(true)
            });
            if let NodeKind::File { .. } = next.kind {
                return Err(Error::PathKindConflict {
                    path: record.path[..=depth].join("/"),
                });
            }
            current = next;
        }

        match current.children.get_mut(last) {
            None => {
                let node = if record.is_directory {
                    Pending::directory(false)
                } else {
                    Pending::file(record.size.unwrap_or(0))
                };
                current.children.insert(last.clone(), node);
            }
            Some(existing) => match (existing.kind, record.is_directory) {
                (NodeKind::Directory { .. }, true) => {
                    existing.kind = NodeKind::Directory { inferred: false };
                }
                (NodeKind::File { .. }, false) => {
                    return Err(Error::invalid(record.joined(), "duplicate entry"));
                }
                _ => {
                    return Err(Error::PathKindConflict {
                        path: record.joined(),
                    });
                }
            },
        }
    }

    debug!(records = records.len(), inferred, "built archive tree");

    let mut node = root.into_node(String::new(), "");
    node.sort_recursive();
    Ok(node)
}
