//! Entry resolution use case
//!
//! Applies a caller decision to one classified entry of a diff report:
//! downloading or deleting a file that only exists remotely, or uploading a
//! file that only exists locally. This is phase 2 of a scan; it never
//! reclassifies anything and never retries. A failed action is reported and
//! left for the next scan.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use md5::{Digest, Md5};
use tracing::{info, warn};

use crate::domain::newtypes::{ContentHash, RelativePath, SyncPath};
use crate::domain::report::{LocalEntry, RemoteEntry, ReportItem};
use crate::domain::{Decision, RemoteNode, ResolutionState};
use crate::ports::{ILocalFileSystem, IRemoteStore, ProgressFn};

/// Progress observer shared by every transfer: `(path, fraction)`
pub type TransferObserver = Arc<dyn Fn(&RelativePath, f64) + Send + Sync>;

/// Result of applying one decision
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub path: RelativePath,
    pub decision: Decision,
    /// `Resolved`, `Failed`, or the unchanged `Detected` state after a skip
    pub state: ResolutionState,
    /// Node created by an upload
    pub created: Option<RemoteNode>,
}

impl ActionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.state, ResolutionState::Failed { .. })
    }
}

/// Use case for resolving classified entries
///
/// Coordinates transfers between the remote store and the local sync folder.
pub struct ResolveEntryUseCase {
    remote_store: Arc<dyn IRemoteStore>,
    local_filesystem: Arc<dyn ILocalFileSystem>,
    sync_root: SyncPath,
    export_mime_type: String,
    observer: Option<TransferObserver>,
}

impl ResolveEntryUseCase {
    /// Creates a new ResolveEntryUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `remote_store` - Remote object store for download/upload/delete
    /// * `local_filesystem` - Local filesystem for reading/writing files
    /// * `sync_root` - Local folder the report's relative paths resolve against
    /// * `export_mime_type` - Target format for native document downloads
    pub fn new(
        remote_store: Arc<dyn IRemoteStore>,
        local_filesystem: Arc<dyn ILocalFileSystem>,
        sync_root: SyncPath,
        export_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            remote_store,
            local_filesystem,
            sync_root,
            export_mime_type: export_mime_type.into(),
            observer: None,
        }
    }

    /// Registers a progress observer for every transfer
    #[must_use]
    pub fn with_observer(mut self, observer: TransferObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Applies `decision` to a report entry
    ///
    /// # Returns
    ///
    /// The outcome; transfer failures are reported as `ResolutionState::Failed`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` (wrapped) if the decision is not
    /// allowed for the entry's classification
    pub async fn apply(&self, item: ReportItem<'_>, decision: Decision) -> Result<ActionOutcome> {
        let mut state = ResolutionState::detected(item.classification());
        state.check(decision)?;

        let path = item.path().clone();
        let result = match (item, decision) {
            (_, Decision::Skip) => {
                return Ok(ActionOutcome {
                    path,
                    decision,
                    state,
                    created: None,
                })
            }
            (ReportItem::Remote(_, entry), Decision::Download) => {
                self.download(entry).await.map(|()| None)
            }
            (ReportItem::Remote(_, entry), Decision::DeleteRemote) => {
                self.delete(entry).await.map(|()| None)
            }
            (ReportItem::Local(entry), Decision::Upload) => self.upload(entry).await.map(Some),
            // Every other pairing was rejected by `check`
            (_, other) => bail!("decision {other} has no action for {path}"),
        };

        match result {
            Ok(created) => {
                state.resolve(decision)?;
                info!(path = %path, decision = %decision, "Entry resolved");
                Ok(ActionOutcome {
                    path,
                    decision,
                    state,
                    created,
                })
            }
            Err(e) => {
                warn!(path = %path, decision = %decision, error = %format!("{e:#}"), "Action failed");
                state.fail(decision, format!("{e:#}"))?;
                Ok(ActionOutcome {
                    path,
                    decision,
                    state,
                    created: None,
                })
            }
        }
    }

    /// Downloads a remote-only file into the sync folder
    ///
    /// Native documents are exported to the configured format. The file is
    /// written only once the whole transfer has completed and its content
    /// matches the remote fingerprint.
    pub async fn download(&self, entry: &RemoteEntry) -> Result<()> {
        let destination = self.sync_root.join_relative(&entry.path);
        let node = &entry.node;

        let content = if node.is_native_document() {
            self.remote_store
                .export(&node.id, &self.export_mime_type, self.progress_for(&entry.path))
                .await
                .context("Failed to export native document")?
        } else {
            self.remote_store
                .download(&node.id, self.progress_for(&entry.path))
                .await
                .context("Failed to download file from remote store")?
        };

        if let Some(remote_hash) = &node.content_hash {
            let local_hash = ContentHash::from_digest(&Md5::digest(&content));
            if local_hash != *remote_hash {
                bail!(
                    "Hash mismatch in downloaded content: got {}, expected {}",
                    local_hash,
                    remote_hash
                );
            }
        }

        self.local_filesystem
            .write_file(&destination, &content)
            .await
            .context("Failed to write downloaded file to local filesystem")?;

        Ok(())
    }

    /// Permanently deletes a remote-only file
    pub async fn delete(&self, entry: &RemoteEntry) -> Result<()> {
        self.remote_store
            .delete_file(&entry.node.id)
            .await
            .context("Failed to delete remote file")
    }

    /// Uploads a local-only file into the container mapped to its parent directory
    pub async fn upload(&self, entry: &LocalEntry) -> Result<RemoteNode> {
        let Some(parent) = entry.parent.remote_id() else {
            bail!("Parent folder of {} does not exist on remote", entry.path);
        };

        let name = entry
            .path
            .file_name()
            .context("Local entry has no file name")?;

        let content = self
            .local_filesystem
            .read_file(&entry.absolute_path)
            .await
            .context("Failed to read local file for upload")?;

        let node = self
            .remote_store
            .create_file(
                parent,
                name,
                mime_type_for(name),
                &content,
                self.progress_for(&entry.path),
            )
            .await
            .context("Failed to upload file via resumable session")?;

        Ok(node)
    }

    fn progress_for(&self, path: &RelativePath) -> Option<ProgressFn> {
        let observer = self.observer.clone()?;
        let path = path.clone();
        Some(Box::new(move |fraction| observer(&path, fraction)))
    }
}

/// Guess a MIME type from a file extension
fn mime_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}
