//! drivesync Sync - Scan and reconciliation engine
//!
//! Provides:
//! - Paginated depth-first walk of a remote container tree
//! - Depth-first walk of the local sync folder with remote lookups
//! - Per-file classification into a [`DiffReport`](drivesync_core::domain::DiffReport)
//! - Policy-driven batch resolution of a finished report
//!
//! ## Modules
//!
//! - [`engine`] - Scan orchestration (remote walk, then local walk)
//! - [`filesystem`] - Local filesystem adapter (atomic writes, MD5 fingerprints)
//! - [`local_walker`] - Local tree walk and container mapping
//! - [`reconciler`] - Per-file classification and report accumulation
//! - [`remote_walker`] - Remote tree walk
//! - [`resolver`] - Batch resolution with explicit write policies

pub mod engine;
pub mod filesystem;
pub mod local_walker;
pub mod reconciler;
pub mod remote_walker;
pub mod resolver;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a scan or a batch resolution as a whole
///
/// Failures below the roots never surface here; they are recorded in the
/// report's error list instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote root container could not be listed
    #[error("Remote root {id} unavailable: {reason}")]
    RemoteRootUnavailable { id: String, reason: String },

    /// The local sync folder could not be listed
    #[error("Local root {} unavailable: {reason}", path.display())]
    LocalRootUnavailable { path: PathBuf, reason: String },

    /// A batch policy names a decision that does not apply to its category
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// A domain-level error propagated from drivesync-core
    #[error("Domain error: {0}")]
    DomainError(#[from] drivesync_core::domain::errors::DomainError),
}
