//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Wraps the [`DriveClient`] and delegates to the listing, download and
//! upload modules to fulfil the [`IRemoteStore`] port contract.
//!
//! ## Design Notes
//!
//! - The client holds no mutable state, so the store needs no lock.
//! - Credentials are supplied by the caller; this store never refreshes a
//!   token. An expired token surfaces as [`DriveError::Unauthorized`](crate::DriveError).
//! - `delete_file` is permanent (`DELETE /files/{id}`), not a move to trash.

use anyhow::{Context, Result};
use reqwest::Method;
use tracing::debug;

use drivesync_core::config::TransferConfig;
use drivesync_core::domain::newtypes::{PageToken, RemoteId};
use drivesync_core::domain::{NodeKind, RemoteNode};
use drivesync_core::ports::{IRemoteStore, ListPage, ProgressFn};

use crate::client::DriveClient;
use crate::{download, listing, upload};

/// Default transfer chunk size: 4 MiB
const DEFAULT_CHUNK_SIZE: u64 = 4 * 1024 * 1024;

// ============================================================================
// DriveRemoteStore
// ============================================================================

/// Remote store backed by the Google Drive v3 API
pub struct DriveRemoteStore {
    client: DriveClient,
    download_chunk_size: u64,
    upload_chunk_size: usize,
}

impl DriveRemoteStore {
    /// Creates a store with 4 MiB transfer chunks
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            download_chunk_size: DEFAULT_CHUNK_SIZE,
            upload_chunk_size: DEFAULT_CHUNK_SIZE as usize,
        }
    }

    /// Creates a store using the chunk sizes from the transfer configuration
    pub fn from_config(client: DriveClient, transfer: &TransferConfig) -> Self {
        Self {
            client,
            download_chunk_size: transfer.download_chunk_bytes(),
            upload_chunk_size: transfer.upload_chunk_bytes() as usize,
        }
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn list_children(
        &self,
        container_id: &RemoteId,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage> {
        listing::list_children(&self.client, container_id, page_token)
            .await
            .with_context(|| format!("Failed to list children of {container_id}"))
    }

    async fn find_by_name(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>> {
        listing::find_by_name(&self.client, name, parent, kind)
            .await
            .with_context(|| format!("Failed to look up '{name}'"))
    }

    async fn download(&self, file_id: &RemoteId, progress: Option<ProgressFn>) -> Result<Vec<u8>> {
        debug!(id = %file_id, chunk = self.download_chunk_size, "DriveRemoteStore::download");
        download::download(
            &self.client,
            file_id,
            self.download_chunk_size,
            progress.as_ref(),
        )
        .await
        .with_context(|| format!("Failed to download {file_id}"))
    }

    async fn export(
        &self,
        file_id: &RemoteId,
        target_mime: &str,
        progress: Option<ProgressFn>,
    ) -> Result<Vec<u8>> {
        download::export(&self.client, file_id, target_mime, progress.as_ref())
            .await
            .with_context(|| format!("Failed to export {file_id} as {target_mime}"))
    }

    async fn create_file(
        &self,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        data: &[u8],
        progress: Option<ProgressFn>,
    ) -> Result<RemoteNode> {
        debug!(
            parent = %parent_id,
            name,
            size = data.len(),
            "DriveRemoteStore::create_file"
        );
        upload::upload_file(
            &self.client,
            parent_id,
            name,
            mime_type,
            data,
            self.upload_chunk_size,
            progress.as_ref(),
        )
        .await
        .with_context(|| format!("Failed to upload '{name}'"))
    }

    async fn delete_file(&self, file_id: &RemoteId) -> Result<()> {
        let path = format!("/files/{}", file_id.as_str());
        self.client
            .send(self.client.request(Method::DELETE, &path))
            .await
            .with_context(|| format!("Failed to delete {file_id}"))?;

        debug!(id = %file_id, "File deleted permanently");
        Ok(())
    }

    async fn get_metadata(&self, file_id: &RemoteId) -> Result<RemoteNode> {
        listing::get_metadata(&self.client, file_id)
            .await
            .with_context(|| format!("Failed to fetch metadata of {file_id}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
