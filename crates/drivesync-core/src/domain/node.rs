//! Remote node descriptor
//!
//! A [`RemoteNode`] is the adapter-independent view of one Drive object as
//! returned by a listing, lookup or metadata request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::newtypes::{ContentHash, RemoteId};

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by Drive-native document types (Docs, Sheets, Slides, ...)
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// Whether a node is a container (folder) or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    File,
}

impl NodeKind {
    /// Derive the kind from a Drive MIME type
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            NodeKind::Container
        } else {
            NodeKind::File
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Container => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// One remote object
///
/// `content_hash` is only present for binary files. Native documents and
/// folders carry none. A node may list several parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: RemoteId,
    pub name: String,
    pub kind: NodeKind,
    pub mime_type: String,
    pub content_hash: Option<ContentHash>,
    #[serde(default)]
    pub parent_ids: Vec<RemoteId>,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

impl RemoteNode {
    /// Creates a node of the given kind with no hash, size or parents
    pub fn new(id: RemoteId, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        Self {
            id,
            name: name.into(),
            kind: NodeKind::from_mime_type(&mime_type),
            mime_type,
            content_hash: None,
            parent_ids: Vec::new(),
            size: None,
            modified: None,
        }
    }

    /// Builder-style setter for the content hash
    #[must_use]
    pub fn with_hash(mut self, hash: ContentHash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    /// Builder-style setter for a parent
    #[must_use]
    pub fn with_parent(mut self, parent: RemoteId) -> Self {
        self.parent_ids.push(parent);
        self
    }

    /// Builder-style setter for the size
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind == NodeKind::Container
    }

    /// True for Docs/Sheets/Slides and other Drive-native formats.
    ///
    /// These have no binary content; downloading them means exporting.
    pub fn is_native_document(&self) -> bool {
        self.kind == NodeKind::File && self.mime_type.starts_with(NATIVE_MIME_PREFIX)
    }

    pub fn has_parent(&self, parent: &RemoteId) -> bool {
        self.parent_ids.iter().any(|p| p == parent)
    }
}
