//! Remote object store port (driven/secondary port)
//!
//! This module defines the interface the reconciliation engine uses to read
//! and modify the remote hierarchy. The primary implementation targets Google
//! Drive v3, where objects are addressed by opaque IDs and containers are
//! listed one page at a time.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - Implementations apply the ownership and not-trashed filters themselves;
//!   every node returned by `list_children(c, _)` has `c` among its parents.

use crate::domain::newtypes::{PageToken, RemoteId};
use crate::domain::node::{NodeKind, RemoteNode};

/// Transfer progress callback receiving the completed fraction in `0.0..=1.0`
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// One page of a container listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Children on this page, in listing order
    pub items: Vec<RemoteNode>,
    /// Token for the following page (None on the last page)
    pub next_page_token: Option<PageToken>,
}

impl ListPage {
    /// True when the page has no items and no continuation
    pub fn is_empty_listing(&self) -> bool {
        self.items.is_empty() && self.next_page_token.is_none()
    }
}

/// Port trait for remote object store operations
///
/// ## Implementation Notes
///
/// - No method retries. Failures are returned to the caller, which records
///   them against the current path.
/// - Progress callbacks receive monotonically increasing fractions and a
///   final `1.0` on success.
/// - All methods assume a valid bearer credential is already available.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists one page of the non-trashed, owned children of a container
    ///
    /// # Arguments
    /// * `container_id` - The container to list
    /// * `page_token` - Token from the previous page (None for the first page)
    async fn list_children(
        &self,
        container_id: &RemoteId,
        page_token: Option<&PageToken>,
    ) -> anyhow::Result<ListPage>;

    /// Finds owned, non-trashed nodes by exact name
    ///
    /// # Arguments
    /// * `name` - Exact node name
    /// * `parent` - Restrict to children of this container
    /// * `kind` - Restrict to containers or files
    ///
    /// # Returns
    /// All matches, across every result page
    async fn find_by_name(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
        kind: Option<NodeKind>,
    ) -> anyhow::Result<Vec<RemoteNode>>;

    /// Downloads the binary content of a file
    async fn download(
        &self,
        file_id: &RemoteId,
        progress: Option<ProgressFn>,
    ) -> anyhow::Result<Vec<u8>>;

    /// Exports a native document to `target_mime`
    async fn export(
        &self,
        file_id: &RemoteId,
        target_mime: &str,
        progress: Option<ProgressFn>,
    ) -> anyhow::Result<Vec<u8>>;

    /// Creates a file inside `parent_id` using a resumable upload
    ///
    /// # Returns
    /// Metadata of the created node
    async fn create_file(
        &self,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        data: &[u8],
        progress: Option<ProgressFn>,
    ) -> anyhow::Result<RemoteNode>;

    /// Permanently deletes a node (bypasses the trash)
    async fn delete_file(&self, file_id: &RemoteId) -> anyhow::Result<()>;

    /// Retrieves metadata for a single node
    async fn get_metadata(&self, file_id: &RemoteId) -> anyhow::Result<RemoteNode>;
}
