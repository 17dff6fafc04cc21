//! Projected listing rows

use serde::Serialize;

use crate::path::VirtualPath;

/// Whether an entry is a stored object or a synthesized directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One row of a directory listing.
///
/// Directories carry no size. Entries are snapshots of the listing that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    name: String,
    path: VirtualPath,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
}

impl Entry {
    pub fn file(
        name: impl Into<String>,
        path: VirtualPath,
        size: u64,
        last_modified: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            kind: EntryKind::File,
            size: Some(size),
            last_modified,
        }
    }

    pub fn directory(name: impl Into<String>, path: VirtualPath) -> Self {
        Self {
            name: name.into(),
            path,
            kind: EntryKind::Directory,
            size: None,
            last_modified: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path: the listing prefix for directories, the object key for files.
    pub fn path(&self) -> &VirtualPath {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }
}
