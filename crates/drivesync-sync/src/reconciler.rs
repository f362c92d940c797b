//! Per-file classification and report accumulation
//!
//! The [`Reconciler`] owns the [`DiffReport`] of one scan. The remote walker
//! hands it every remote file it reaches; the local walker hands it local
//! files without a remote counterpart and per-path failures.

use std::sync::Arc;

use tracing::{debug, warn};

use drivesync_core::domain::newtypes::{RelativePath, SyncPath};
use drivesync_core::domain::{
    DiffReport, IssueKind, LocalEntry, RemoteEntry, RemoteNode, ScanIssue,
};
use drivesync_core::ports::ILocalFileSystem;

/// Outcome of classifying one remote file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVerdict {
    NewOnRemote,
    Updated,
    Unverifiable,
    InSync,
    /// Recorded in the report's error list
    Failed,
}

/// Accumulates classifications for a single scan
pub struct Reconciler {
    local_filesystem: Arc<dyn ILocalFileSystem>,
    sync_root: SyncPath,
    report: DiffReport,
}

impl Reconciler {
    /// Start an empty report for `sync_root`
    pub fn new(local_filesystem: Arc<dyn ILocalFileSystem>, sync_root: SyncPath) -> Self {
        Self {
            local_filesystem,
            sync_root,
            report: DiffReport::new(),
        }
    }

    pub fn report(&self) -> &DiffReport {
        &self.report
    }

    /// Finish the scan and hand the report to the caller
    pub fn into_report(self) -> DiffReport {
        self.report
    }

    /// Compare a remote file with whatever exists at the same local path
    pub async fn classify(&mut self, path: &RelativePath, node: &RemoteNode) -> FileVerdict {
        let local_path = self.sync_root.join_relative(path);

        let state = match self.local_filesystem.get_state(&local_path).await {
            Ok(state) => state,
            Err(e) => {
                return self.fail(path, IssueKind::LocalIo, format!("cannot stat: {e:#}"));
            }
        };

        if !state.exists {
            debug!(path = %path, "New on remote");
            self.report.new_on_remote.push(remote_entry(path, node));
            return FileVerdict::NewOnRemote;
        }

        if state.is_directory() {
            return self.fail(
                path,
                IssueKind::LocalIo,
                "local path is a directory, remote is a file",
            );
        }

        let Some(remote_hash) = &node.content_hash else {
            debug!(path = %path, mime_type = %node.mime_type, "No remote fingerprint");
            self.report.unverifiable.push(remote_entry(path, node));
            return FileVerdict::Unverifiable;
        };

        let local_hash = match self.local_filesystem.compute_hash(&local_path).await {
            Ok(hash) => hash,
            Err(e) => {
                return self.fail(path, IssueKind::LocalIo, format!("cannot hash: {e:#}"));
            }
        };

        if local_hash == *remote_hash {
            FileVerdict::InSync
        } else {
            debug!(path = %path, local = %local_hash, remote = %remote_hash, "Updated");
            self.report.updated.push(remote_entry(path, node));
            FileVerdict::Updated
        }
    }

    pub fn record_new_on_local(&mut self, entry: LocalEntry) {
        debug!(path = %entry.path, "New on local");
        self.report.new_on_local.push(entry);
    }

    /// Record a per-path failure; a second failure of the same kind for the same path is dropped
    pub fn record_issue(&mut self, issue: ScanIssue) {
        let duplicate = self
            .report
            .errors
            .iter()
            .any(|e| e.path == issue.path && e.kind == issue.kind);
        if duplicate {
            debug!(path = %issue.path, kind = %issue.kind, "Failure already recorded");
            return;
        }
        warn!(path = %issue.path, kind = %issue.kind, reason = %issue.reason, "Scan error");
        self.report.errors.push(issue);
    }

    pub fn record_empty_folder(&mut self, path: RelativePath) {
        debug!(path = %path, "Empty folder");
        self.report.empty_folders.push(path);
    }

    fn fail(&mut self, path: &RelativePath, kind: IssueKind, reason: impl Into<String>) -> FileVerdict {
        self.record_issue(ScanIssue::new(path.clone(), kind, reason));
        FileVerdict::Failed
    }
}

fn remote_entry(path: &RelativePath, node: &RemoteNode) -> RemoteEntry {
    RemoteEntry {
        path: path.clone(),
        node: node.clone(),
    }
}
