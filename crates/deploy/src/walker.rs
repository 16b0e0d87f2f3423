//! Depth-first file enumeration over a [`Node`] tree.
//!
//! Entries whose name starts with `.` are skipped at every depth, together
//! with everything below them. Paths are `/`-joined and relative to the
//! directory the walk started from.

use std::collections::btree_map;

use crate::error::DeployError;
use crate::tree::Node;

/// A file produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub content: Vec<u8>,
}

/// Lazy depth-first iterator over the files below a directory.
///
/// Siblings are visited in name order, so an unchanged tree always yields
/// the same sequence.
pub struct Walker<'a> {
    stack: Vec<(String, btree_map::Iter<'a, String, Node>)>,
}

impl<'a> Iterator for Walker<'a> {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            let (prefix, children) = self.stack.last_mut()?;
            let Some((name, node)) = children.next() else {
                self.stack.pop();
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            match node {
                Node::Directory(entries) => self.stack.push((path, entries.iter())),
                Node::File(content) => {
                    return Some(FileEntry {
                        path,
                        content: content.clone(),
                    });
                }
            }
        }
    }
}

/// Starts a walk at `start_path` below `root`.
///
/// Fails with [`DeployError::NotFound`] if `start_path` does not resolve to
/// a directory.
pub fn walk<'a>(root: &'a Node, start_path: &str) -> Result<Walker<'a>, DeployError> {
    match root.lookup(start_path) {
        Some(Node::Directory(entries)) => Ok(Walker {
            stack: vec![(String::new(), entries.iter())],
        }),
        Some(Node::File(_)) => Err(DeployError::NotFound(format!(
            "not a directory: {start_path}"
        ))),
        None => Err(DeployError::NotFound(format!(
            "no such directory: {start_path}"
        ))),
    }
}
