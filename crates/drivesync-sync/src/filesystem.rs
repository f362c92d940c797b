//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Atomic writes**: Uses write-to-temp + rename so an interrupted write
//!   never leaves a truncated file at the destination.
//! - **MD5 fingerprints**: Streams the file through `md-5` so local hashes
//!   compare directly with Drive's `md5Checksum`.
//! - **No symlink following**: `list_dir` reports symlinks as
//!   [`LocalEntryKind::Other`].

use std::io::ErrorKind;

use chrono::DateTime;
use drivesync_core::{
    domain::newtypes::{ContentHash, SyncPath},
    ports::local_filesystem::{DirEntry, FileSystemState, ILocalFileSystem, LocalEntryKind},
};
use md5::{Digest, Md5};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

/// Read buffer used while hashing
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the [`SyncPath`] arguments. Configuration (e.g. sync root) lives
/// at a higher layer.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(path = %path))]
    async fn list_dir(&self, path: &SyncPath) -> anyhow::Result<Vec<DirEntry>> {
        let mut reader = tokio::fs::read_dir(path.as_path()).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                debug!(name = ?entry.file_name(), "skipping non UTF-8 name");
                continue;
            };

            // file_type() does not follow symlinks
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                LocalEntryKind::Directory
            } else if file_type.is_file() {
                LocalEntryKind::File
            } else {
                LocalEntryKind::Other
            };

            entries.push(DirEntry { name, kind });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(entries = entries.len(), "directory listed");
        Ok(entries)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn get_state(&self, path: &SyncPath) -> anyhow::Result<FileSystemState> {
        let metadata = match tokio::fs::metadata(path.as_path()).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("path not found");
                return Ok(FileSystemState::not_found());
            }
            Err(e) => return Err(e.into()),
        };

        let is_file = metadata.is_file();
        let size = metadata.len();

        let modified = metadata.modified().ok().and_then(|st| {
            st.duration_since(std::time::UNIX_EPOCH)
                .ok()
                .and_then(|dur| DateTime::from_timestamp(dur.as_secs() as i64, dur.subsec_nanos()))
        });

        debug!(exists = true, is_file, size, "state retrieved");

        Ok(FileSystemState {
            exists: true,
            is_file,
            size,
            modified,
        })
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn read_file(&self, path: &SyncPath) -> anyhow::Result<Vec<u8>> {
        debug!("reading file");
        let data = tokio::fs::read(path.as_path()).await?;
        debug!(bytes = data.len(), "file read complete");
        Ok(data)
    }

    #[instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    async fn write_file(&self, path: &SyncPath, data: &[u8]) -> anyhow::Result<()> {
        let target = path.as_path();

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Same directory so the rename stays on one filesystem
        let tmp_path = {
            let mut p = target.as_os_str().to_owned();
            p.push(".drivesync-tmp");
            std::path::PathBuf::from(p)
        };

        debug!(?tmp_path, "writing to temporary file");
        if let Err(e) = tokio::fs::write(&tmp_path, data).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!("renaming temporary file to target");
        if let Err(e) = tokio::fs::rename(&tmp_path, target).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn compute_hash(&self, path: &SyncPath) -> anyhow::Result<ContentHash> {
        let mut file = tokio::fs::File::open(path.as_path()).await?;
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        let hash = ContentHash::from_digest(&hasher.finalize());
        debug!(hash = %hash, "hash computed");
        Ok(hash)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
