//! Scan engine
//!
//! The [`ScanEngine`] runs phase 1 of a reconciliation: it compares a remote
//! container tree with a local folder and returns a [`DiffReport`]. Nothing is
//! written on either side.
//!
//! ## Scan Flow
//!
//! 1. **Remote walk**: every remote file is classified against the local path
//!    it would occupy (new on remote, updated, unverifiable, in sync)
//! 2. **Local walk**: local files with no remote counterpart are reported as
//!    new on local, together with the container their parent maps to
//! 3. **Report**: the accumulated report is handed to the caller
//!
//! Each call starts from an empty report; two scans without mutations in
//! between produce identical reports.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, instrument};

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::newtypes::{RelativePath, RemoteId, SyncPath};
use drivesync_core::domain::DiffReport;
use drivesync_core::ports::{ILocalFileSystem, IRemoteStore};

use crate::local_walker::{LocalTreeWalker, LocalWalkStats};
use crate::reconciler::Reconciler;
use crate::remote_walker::{RemoteTreeWalker, RemoteWalkStats};

// ============================================================================
// ScanResult
// ============================================================================

/// A finished scan: the report plus traversal counters
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub report: DiffReport,
    pub remote: RemoteWalkStats,
    pub local: LocalWalkStats,
    /// Wall-clock duration of the scan in milliseconds
    pub duration_ms: u64,
}

// ============================================================================
// ScanEngine
// ============================================================================

/// Orchestrates the remote and local walks of one scan
///
/// ## Dependencies
///
/// - `remote_store`: listings and name lookups
/// - `local_filesystem`: directory listings, stat and fingerprints
/// - `lookup`: strategy used to match local entries to remote nodes
pub struct ScanEngine {
    remote_store: Arc<dyn IRemoteStore>,
    local_filesystem: Arc<dyn ILocalFileSystem>,
    lookup: LocalLookup,
}

impl ScanEngine {
    pub fn new(
        remote_store: Arc<dyn IRemoteStore>,
        local_filesystem: Arc<dyn ILocalFileSystem>,
        lookup: LocalLookup,
    ) -> Self {
        Self {
            remote_store,
            local_filesystem,
            lookup,
        }
    }

    /// Compares `remote_root` with `sync_root` and returns the report
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RemoteRootUnavailable`](crate::SyncError) or
    /// [`SyncError::LocalRootUnavailable`](crate::SyncError) when either root
    /// cannot be listed. Every other failure is recorded in the report.
    pub async fn scan(&self, sync_root: &SyncPath, remote_root: &RemoteId) -> Result<DiffReport> {
        Ok(self.scan_with_stats(sync_root, remote_root).await?.report)
    }

    /// Same as [`scan`](Self::scan), keeping the traversal counters
    #[instrument(skip(self), fields(sync_root = %sync_root, remote_root = %remote_root, lookup = %self.lookup))]
    pub async fn scan_with_stats(
        &self,
        sync_root: &SyncPath,
        remote_root: &RemoteId,
    ) -> Result<ScanResult> {
        let start = std::time::Instant::now();
        info!("Starting scan");

        let mut reconciler = Reconciler::new(Arc::clone(&self.local_filesystem), sync_root.clone());

        let remote = RemoteTreeWalker::new(Arc::clone(&self.remote_store))
            .walk(remote_root, RelativePath::root(), &mut reconciler)
            .await?;

        let local = LocalTreeWalker::new(
            Arc::clone(&self.remote_store),
            Arc::clone(&self.local_filesystem),
            self.lookup,
        )
        .walk(sync_root, remote_root, &mut reconciler)
        .await?;

        let report = reconciler.into_report();
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            new_on_remote = report.new_on_remote.len(),
            new_on_local = report.new_on_local.len(),
            updated = report.updated.len(),
            unverifiable = report.unverifiable.len(),
            errors = report.errors.len(),
            duration_ms,
            "Scan complete"
        );

        Ok(ScanResult {
            report,
            remote,
            local,
            duration_ms,
        })
    }
}
