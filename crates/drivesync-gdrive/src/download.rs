//! Download operations for Google Drive
//!
//! - [`download`] - Ranged `alt=media` requests for binary files
//! - [`export`] - Conversion of native documents to a fixed target format
//!
//! Both return the complete buffer; callers write it to disk only after the
//! transfer has finished.

use futures_util::StreamExt;
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::ports::ProgressFn;

use crate::client::{check_status, DriveClient};
use crate::DriveError;

/// Parses the total length out of `Content-Range: bytes 0-99/1234`
fn parse_total_length(content_range: &str) -> Option<u64> {
    content_range
        .strip_prefix("bytes ")?
        .rsplit_once('/')?
        .1
        .parse()
        .ok()
}

fn report(progress: Option<&ProgressFn>, done: u64, total: u64) {
    if let Some(progress) = progress {
        let fraction = if total == 0 {
            1.0
        } else {
            (done as f64 / total as f64).min(1.0)
        };
        progress(fraction);
    }
}

/// Downloads a binary file in ranged chunks of `chunk_size` bytes
///
/// A `200` answer (range ignored by the server) completes the transfer in
/// one chunk. Progress is reported after every chunk.
#[instrument(skip(client, progress), fields(id = %id))]
pub async fn download(
    client: &DriveClient,
    id: &RemoteId,
    chunk_size: u64,
    progress: Option<&ProgressFn>,
) -> Result<Vec<u8>, DriveError> {
    let path = format!("/files/{}", id.as_str());
    let chunk_size = chunk_size.max(1);
    let mut data = Vec::new();
    let mut total: Option<u64> = None;

    loop {
        let start = data.len() as u64;
        let end = start + chunk_size - 1;
        let response = client
            .request(Method::GET, &path)
            .query(&[("alt", "media")])
            .header(RANGE, format!("bytes={start}-{end}"))
            .send()
            .await?;

        // Drive answers 416 to any range on an empty file
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE && start == 0 {
            report(progress, 0, 0);
            return Ok(data);
        }

        let response = check_status(response).await?;
        if response.status() == StatusCode::OK {
            let body = response.bytes().await?;
            debug!(bytes = body.len(), "Server returned the whole file");
            report(progress, 1, 1);
            return Ok(body.to_vec());
        }

        let length = match total {
            Some(length) => length,
            None => {
                let length = response
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_total_length)
                    .ok_or_else(|| {
                        DriveError::InvalidResponse(
                            "partial content without a Content-Range total".to_string(),
                        )
                    })?;
                total = Some(length);
                length
            }
        };

        let chunk = response.bytes().await?;
        if chunk.is_empty() && (data.len() as u64) < length {
            return Err(DriveError::InvalidResponse(format!(
                "empty chunk at offset {start} of {length}"
            )));
        }
        data.extend_from_slice(&chunk);
        report(progress, data.len() as u64, length);
        debug!(received = data.len(), total = length, "Chunk received");

        if data.len() as u64 >= length {
            return Ok(data);
        }
    }
}

/// Exports a native document to `target_mime`
///
/// Progress follows the response body as it streams in; without a
/// `Content-Length` only completion is reported.
#[instrument(skip(client, progress), fields(id = %id, target_mime))]
pub async fn export(
    client: &DriveClient,
    id: &RemoteId,
    target_mime: &str,
    progress: Option<&ProgressFn>,
) -> Result<Vec<u8>, DriveError> {
    let response = client
        .send(
            client
                .request(Method::GET, &format!("/files/{}/export", id.as_str()))
                .query(&[("mimeType", target_mime)]),
        )
        .await?;

    let expected = response.content_length();
    let mut data = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk?);
        if let Some(expected) = expected {
            report(progress, data.len() as u64, expected);
        }
    }
    if expected.is_none() {
        report(progress, 1, 1);
    }

    debug!(bytes = data.len(), "Export complete");
    Ok(data)
}
