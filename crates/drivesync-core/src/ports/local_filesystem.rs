//! Local filesystem port (driven/secondary port)
//!
//! This module defines the interface for interacting with the local
//! sync folder: listing directories, checking existence, reading and
//! writing whole files, and computing content fingerprints.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - All paths are `SyncPath` instances; joining a root-relative path is
//!   done with [`SyncPath::join_relative`].

use chrono::{DateTime, Utc};

use crate::domain::newtypes::{ContentHash, SyncPath};

/// Type of a local directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalEntryKind {
    Directory,
    File,
    /// Symlinks and special files; never followed or hashed
    Other,
}

/// One entry returned by [`ILocalFileSystem::list_dir`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name (single path component)
    pub name: String,
    pub kind: LocalEntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: LocalEntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Snapshot of a path's state on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSystemState {
    /// Whether the file/directory exists on disk
    pub exists: bool,
    /// Whether this is a regular file (false for directories and other types)
    pub is_file: bool,
    /// Size in bytes (0 for directories or non-existent files)
    pub size: u64,
    /// Last modification time (None if not available or file doesn't exist)
    pub modified: Option<DateTime<Utc>>,
}

impl FileSystemState {
    /// Returns a state representing a non-existent path
    pub fn not_found() -> Self {
        Self {
            exists: false,
            is_file: false,
            size: 0,
            modified: None,
        }
    }

    /// Returns true if the path exists and is not a regular file
    pub fn is_directory(&self) -> bool {
        self.exists && !self.is_file
    }
}

/// Port trait for local filesystem operations
///
/// ## Implementation Notes
///
/// - `compute_hash` must produce the same MD5 hex fingerprint Drive reports
///   as `md5Checksum`.
/// - `write_file` replaces the destination atomically: readers never see a
///   partially written file.
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Lists the entries of a directory, sorted by name
    ///
    /// Entries whose names are not valid UTF-8 are skipped.
    async fn list_dir(&self, path: &SyncPath) -> anyhow::Result<Vec<DirEntry>>;

    /// Gets the current state of a file or directory
    ///
    /// Returns `FileSystemState::not_found()` if the path doesn't exist
    /// (does not return an error for missing paths).
    async fn get_state(&self, path: &SyncPath) -> anyhow::Result<FileSystemState>;

    /// Reads the entire contents of a file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read
    async fn read_file(&self, path: &SyncPath) -> anyhow::Result<Vec<u8>>;

    /// Writes data to a file, creating it (and its parent directories) if necessary
    ///
    /// If the file already exists, its contents are replaced.
    async fn write_file(&self, path: &SyncPath, data: &[u8]) -> anyhow::Result<()>;

    /// Computes the MD5 fingerprint of a file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read
    async fn compute_hash(&self, path: &SyncPath) -> anyhow::Result<ContentHash>;
}
