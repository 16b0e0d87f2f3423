//! In-memory directory trees.
//!
//! A deploy operates on a [`Node`] tree. Trees are either built in memory
//! (the virtual filesystem of the hosting shell) or loaded from a real
//! directory with [`Node::from_disk`].

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use tracing::debug;

use crate::error::DeployError;

/// A directory entry: either a container keyed by entry name or a leaf
/// holding raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(BTreeMap<String, Node>),
    File(Vec<u8>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Directory(BTreeMap::new())
    }
}

impl Node {
    /// Creates a leaf from anything byte-like.
    pub fn file(content: impl Into<Vec<u8>>) -> Self {
        Node::File(content.into())
    }

    /// Creates a directory from `(name, node)` pairs.
    pub fn dir<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        Node::Directory(
            entries
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// Resolves a `/`-separated path below this node.
    ///
    /// Empty and `.` segments are ignored, `..` moves to the parent and
    /// stops at this node. Returns `None` if any segment is missing or
    /// descends through a file.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        let mut stack: Vec<&Node> = vec![self];
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                name => {
                    let current = *stack.last()?;
                    let Node::Directory(children) = current else {
                        return None;
                    };
                    stack.push(children.get(name)?);
                }
            }
        }
        stack.last().copied()
    }

    /// Loads a real directory into a tree.
    ///
    /// Only regular files and directories are kept. Hidden entries are
    /// loaded too; filtering them is the walker's job.
    pub fn from_disk(root: &Path) -> Result<Node, DeployError> {
        if !root.is_dir() {
            return Err(DeployError::NotFound(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        let node = load_dir(root)?;
        debug!(root = %root.display(), "loaded directory tree");
        Ok(node)
    }
}

fn load_dir(current: &Path) -> Result<Node, DeployError> {
    let mut children = BTreeMap::new();

    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();

        let node = if metadata.is_dir() {
            load_dir(&path)?
        } else if metadata.is_file() {
            Node::File(std::fs::read(&path)?)
        } else {
            continue;
        };

        // Distinct non-UTF-8 names can share a lossy rendering.
        match children.entry(name) {
            Entry::Vacant(vacant) => {
                vacant.insert(node);
            }
            Entry::Occupied(occupied) => {
                return Err(DeployError::DuplicatePath(format!(
                    "{} (in {})",
                    occupied.key(),
                    current.display()
                )));
            }
        }
    }

    Ok(Node::Directory(children))
}

/// Joins the deploy folder onto the current directory.
///
/// An absent or empty folder deploys `cwd` itself; a folder starting with
/// `/` is taken from the tree root.
pub fn resolve_deploy_path(cwd: &str, folder: Option<&str>) -> String {
    match folder.map(str::trim) {
        None | Some("") => cwd.to_string(),
        Some(f) if f.starts_with('/') => f.to_string(),
        Some(f) if cwd.is_empty() => f.to_string(),
        Some(f) => format!("{}/{}", cwd.trim_end_matches('/'), f),
    }
}
