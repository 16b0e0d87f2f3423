//! Manifest building: `path -> digest` plus the content to upload by path.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use sitedrop_protocol::CreateSiteRequest;
use sitedrop_transfer::{digest, validate_upload_path};
use tracing::debug;

use crate::error::DeployError;
use crate::walker::FileEntry;

/// Mapping from path to content digest. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: BTreeMap<String, String>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the digest recorded for `path`.
    pub fn digest(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Iterates `(path, digest)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    /// Returns every path whose content has the given digest, in path order.
    pub fn paths_for_digest<'a>(&'a self, digest: &str) -> impl Iterator<Item = &'a str> {
        self.iter()
            .filter(move |(_, d)| *d == digest)
            .map(|(p, _)| p)
    }

    /// Builds the create-site payload for this manifest.
    pub fn to_request(&self) -> CreateSiteRequest {
        CreateSiteRequest {
            files: self.files.clone(),
        }
    }
}

/// Raw content keyed by path, kept beside the [`Manifest`] so required
/// digests can be resolved back to bytes.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    contents: BTreeMap<String, Vec<u8>>,
}

impl ContentStore {
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.contents.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Total size of all stored content in bytes.
    pub fn total_bytes(&self) -> usize {
        self.contents.values().map(Vec::len).sum()
    }
}

/// Digests every entry and indexes it by path.
///
/// Consumes `entries` once. A path seen twice fails with
/// [`DeployError::DuplicatePath`] instead of overwriting the first.
pub fn build(
    entries: impl IntoIterator<Item = FileEntry>,
) -> Result<(Manifest, ContentStore), DeployError> {
    let mut files = BTreeMap::new();
    let mut contents = BTreeMap::new();

    for entry in entries {
        validate_upload_path(&entry.path)?;

        match files.entry(entry.path) {
            Entry::Occupied(occupied) => {
                return Err(DeployError::DuplicatePath(occupied.key().clone()));
            }
            Entry::Vacant(vacant) => {
                let path = vacant.key().clone();
                vacant.insert(digest(&entry.content));
                contents.insert(path, entry.content);
            }
        }
    }

    let contents = ContentStore { contents };
    debug!(
        files = files.len(),
        bytes = contents.total_bytes(),
        "manifest built"
    );

    Ok((Manifest { files }, contents))
}
