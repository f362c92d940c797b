//! Resumable uploads for Google Drive
//!
//! Provides:
//! - [`create_upload_session`] - Starts a resumable session for a new file
//! - [`upload_chunk`] - Sends one `Content-Range` chunk within a session
//! - [`upload_file`] - Creates a file in a parent folder, chunk by chunk
//!
//! ## Drive API References
//!
//! - [Resumable upload](https://developers.google.com/drive/api/guides/manage-uploads#resumable)

use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info, instrument};

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::domain::RemoteNode;
use drivesync_core::ports::ProgressFn;

use crate::client::{check_status, DriveClient};
use crate::files::{DriveFile, FILE_FIELDS};
use crate::DriveError;

/// Chunks must be multiples of 256 KiB, except the last one
pub const CHUNK_ALIGNMENT: usize = 256 * 1024;

/// Outcome of sending one chunk
#[derive(Debug)]
pub enum ChunkResult {
    /// `308 Resume Incomplete`: more chunks expected
    Incomplete,
    /// `200`/`201`: the file was created
    Complete(DriveFile),
}

/// Builds the `Content-Range` value for one chunk
fn content_range(start: usize, len: usize, total: usize) -> String {
    if total == 0 {
        "bytes */0".to_string()
    } else {
        format!("bytes {}-{}/{}", start, start + len - 1, total)
    }
}

/// Rounds a chunk size down to the 256 KiB alignment (at least one unit)
fn aligned_chunk_size(chunk_size: usize) -> usize {
    (chunk_size / CHUNK_ALIGNMENT).max(1) * CHUNK_ALIGNMENT
}

/// Starts a resumable upload session and returns its URL
///
/// `POST {upload}/files?uploadType=resumable` with the file metadata; the
/// session URL comes back in the `Location` header.
pub async fn create_upload_session(
    client: &DriveClient,
    parent: &RemoteId,
    name: &str,
    mime_type: &str,
    total: usize,
) -> Result<String, DriveError> {
    let metadata = json!({
        "name": name,
        "parents": [parent.as_str()],
        "mimeType": mime_type,
    });

    let response = client
        .send(
            client
                .upload_request(Method::POST, "/files")
                .query(&[("uploadType", "resumable"), ("fields", FILE_FIELDS)])
                .header("X-Upload-Content-Type", mime_type)
                .header("X-Upload-Content-Length", total.to_string())
                .json(&metadata),
        )
        .await?;

    let session_url = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            DriveError::InvalidResponse("upload session response has no Location".to_string())
        })?
        .to_string();

    debug!(name, "Created upload session");
    Ok(session_url)
}

/// Sends bytes `start..start + chunk.len()` of a `total`-byte upload
pub async fn upload_chunk(
    client: &DriveClient,
    session_url: &str,
    chunk: &[u8],
    start: usize,
    total: usize,
    mime_type: &str,
) -> Result<ChunkResult, DriveError> {
    let response = client
        .session_request(Method::PUT, session_url)
        .header(CONTENT_RANGE, content_range(start, chunk.len(), total))
        .header(CONTENT_TYPE, mime_type)
        .body(chunk.to_vec())
        .send()
        .await?;

    // 308 is not a success status; handle it before the generic check
    if response.status() == StatusCode::PERMANENT_REDIRECT {
        return Ok(ChunkResult::Incomplete);
    }

    let response = check_status(response).await?;
    let body = response.text().await?;
    let file: DriveFile =
        serde_json::from_str(&body).map_err(|e| DriveError::InvalidResponse(e.to_string()))?;
    Ok(ChunkResult::Complete(file))
}

/// Uploads `data` as a new file called `name` inside `parent`
///
/// Progress is reported after every chunk and only increases.
#[instrument(skip(client, data, progress), fields(parent = %parent, size = data.len()))]
pub async fn upload_file(
    client: &DriveClient,
    parent: &RemoteId,
    name: &str,
    mime_type: &str,
    data: &[u8],
    chunk_size: usize,
    progress: Option<&ProgressFn>,
) -> Result<RemoteNode, DriveError> {
    let total = data.len();
    let chunk_size = aligned_chunk_size(chunk_size);
    let session_url = create_upload_session(client, parent, name, mime_type, total).await?;

    let mut offset = 0;
    loop {
        let end = (offset + chunk_size).min(total);
        let result = upload_chunk(
            client,
            &session_url,
            &data[offset..end],
            offset,
            total,
            mime_type,
        )
        .await?;
        offset = end;

        if let Some(progress) = progress {
            progress(if total == 0 { 1.0 } else { offset as f64 / total as f64 });
        }

        match result {
            ChunkResult::Complete(file) => {
                let node = RemoteNode::try_from(file)?;
                info!(id = %node.id, name, "Upload complete");
                return Ok(node);
            }
            ChunkResult::Incomplete if offset < total => {
                debug!(offset, total, "Chunk accepted");
            }
            ChunkResult::Incomplete => {
                return Err(DriveError::InvalidResponse(
                    "upload session still incomplete after the last chunk".to_string(),
                ));
            }
        }
    }
}
