//! Diff report produced by a scan
//!
//! A [`DiffReport`] is returned by value from every scan and owned by the
//! caller. Each list keeps traversal order.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::newtypes::{RelativePath, RemoteId, SyncPath};
use super::node::RemoteNode;
use super::resolution::Classification;

/// Remote container a local directory corresponds to, if any
///
/// `Unmapped` propagates to every descendant of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "id")]
pub enum ContainerMapping {
    Mapped(RemoteId),
    Unmapped,
}

impl ContainerMapping {
    pub fn remote_id(&self) -> Option<&RemoteId> {
        match self {
            ContainerMapping::Mapped(id) => Some(id),
            ContainerMapping::Unmapped => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, ContainerMapping::Mapped(_))
    }
}

/// A remote file found during the remote walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub path: RelativePath,
    pub node: RemoteNode,
}

/// A local file without a remote counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    pub path: RelativePath,
    pub absolute_path: SyncPath,
    /// Mapping of the file's parent directory; the upload target
    pub parent: ContainerMapping,
}

/// Category of a per-path failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A listing, lookup or transfer against the remote store failed
    RemoteRequest,
    /// A local read, list or stat failed, or the local entry has the wrong type
    LocalIo,
    /// A name that cannot be represented as a path component (e.g. contains '/')
    InvalidName,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::RemoteRequest => write!(f, "remote request"),
            IssueKind::LocalIo => write!(f, "local i/o"),
            IssueKind::InvalidName => write!(f, "invalid name"),
        }
    }
}

/// An error recorded against one path; the scan continued past it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub path: RelativePath,
    pub kind: IssueKind,
    pub reason: String,
}

impl ScanIssue {
    pub fn new(path: RelativePath, kind: IssueKind, reason: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            reason: reason.into(),
        }
    }
}

/// Borrowed view of one classified report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportItem<'a> {
    Remote(Classification, &'a RemoteEntry),
    Local(&'a LocalEntry),
}

impl<'a> ReportItem<'a> {
    pub fn classification(&self) -> Classification {
        match self {
            ReportItem::Remote(classification, _) => *classification,
            ReportItem::Local(_) => Classification::NewOnLocal,
        }
    }

    pub fn path(&self) -> &'a RelativePath {
        match self {
            ReportItem::Remote(_, entry) => &entry.path,
            ReportItem::Local(entry) => &entry.path,
        }
    }
}

/// Result of reconciling a local tree against a remote tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub new_on_remote: Vec<RemoteEntry>,
    pub new_on_local: Vec<LocalEntry>,
    pub updated: Vec<RemoteEntry>,
    /// Native documents with a local file of the same path; no fingerprint to compare
    pub unverifiable: Vec<RemoteEntry>,
    pub errors: Vec<ScanIssue>,
    /// Remote folders whose listing came back empty (informational)
    pub empty_folders: Vec<RelativePath>,
}

impl DiffReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every list
    pub fn clear(&mut self) {
        self.new_on_remote.clear();
        self.new_on_local.clear();
        self.updated.clear();
        self.unverifiable.clear();
        self.errors.clear();
        self.empty_folders.clear();
    }

    /// True when nothing differs and nothing failed
    pub fn is_clean(&self) -> bool {
        self.new_on_remote.is_empty()
            && self.new_on_local.is_empty()
            && self.updated.is_empty()
            && self.unverifiable.is_empty()
            && self.errors.is_empty()
    }

    /// Number of entries that can be acted on in phase 2
    pub fn actionable_count(&self) -> usize {
        self.new_on_remote.len() + self.new_on_local.len()
    }

    /// Every classified entry: new on remote, new on local, updated, unverifiable
    pub fn items(&self) -> impl Iterator<Item = ReportItem<'_>> {
        remote_items(&self.new_on_remote, Classification::NewOnRemote)
            .chain(self.new_on_local.iter().map(ReportItem::Local))
            .chain(remote_items(&self.updated, Classification::Updated))
            .chain(remote_items(&self.unverifiable, Classification::Unverifiable))
    }

    pub fn new_on_remote_paths(&self) -> Vec<&str> {
        self.new_on_remote.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn new_on_local_paths(&self) -> Vec<&str> {
        self.new_on_local.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn updated_paths(&self) -> Vec<&str> {
        self.updated.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn unverifiable_paths(&self) -> Vec<&str> {
        self.unverifiable.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn error_paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn empty_folder_paths(&self) -> Vec<&str> {
        self.empty_folders.iter().map(|p| p.as_str()).collect()
    }
}

fn remote_items(
    entries: &[RemoteEntry],
    classification: Classification,
) -> impl Iterator<Item = ReportItem<'_>> {
    entries
        .iter()
        .map(move |entry| ReportItem::Remote(classification, entry))
}
