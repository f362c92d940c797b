//! Integration tests for downloads, exports, uploads and deletes

use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::ports::{IRemoteStore, ProgressFn};
use drivesync_gdrive::upload::CHUNK_ALIGNMENT;
use drivesync_gdrive::{download, upload, DriveError};

use crate::common;

fn recorder() -> (ProgressFn, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (Box::new(move |f: f64| sink.lock().unwrap().push(f)), seen)
}

fn id(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

// ============================================================================
// Download tests
// ============================================================================

#[tokio::test]
async fn test_download_in_ranged_chunks() {
    let (server, client) = common::setup_drive_mock().await;
    let content = b"0123456789";
    for (range, start, end) in [("bytes=0-3", 0, 4), ("bytes=4-7", 4, 8), ("bytes=8-11", 8, 10)] {
        Mock::given(method("GET"))
            .and(path("/files/file-1"))
            .and(query_param("alt", "media"))
            .and(header("Range", range))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header("Content-Range", format!("bytes {}-{}/10", start, end - 1))
                    .set_body_bytes(content[start..end].to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let (progress, seen) = recorder();
    let data = download::download(&client, &id("file-1"), 4, Some(&progress))
        .await
        .expect("download failed");

    assert_eq!(data, content);
    assert_eq!(*seen.lock().unwrap(), vec![0.4, 0.8, 1.0]);
}

#[tokio::test]
async fn test_download_whole_body_when_range_ignored() {
    let (server, client) = common::setup_drive_mock().await;
    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/files/large-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let data = common::store(client)
        .download(&id("large-1"), None)
        .await
        .unwrap();

    assert_eq!(data.len(), 1_048_576);
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/empty-1"))
        .respond_with(ResponseTemplate::new(416))
        .mount(&server)
        .await;

    let (progress, seen) = recorder();
    let data = download::download(&client, &id("empty-1"), 4, Some(&progress))
        .await
        .unwrap();

    assert!(data.is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![1.0]);
}

#[tokio::test]
async fn test_download_failure_maps_status() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = common::store(client)
        .download(&id("gone"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_export_native_document() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/doc-1/export"))
        .and(query_param("mimeType", "application/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 exported".to_vec())
                .insert_header("Content-Type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let (progress, seen) = recorder();
    let data = common::store(client)
        .export(&id("doc-1"), "application/pdf", Some(progress))
        .await
        .unwrap();

    assert_eq!(data, b"%PDF-1.4 exported");
    assert_eq!(seen.lock().unwrap().last().copied(), Some(1.0));
}

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_resumable_upload_in_two_chunks() {
    let (server, client) = common::setup_drive_mock().await;
    let total = CHUNK_ALIGNMENT + 1000;
    let data = vec![7u8; total];
    let session_url = format!("{}/session/s1", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/session/s1"))
        .and(header(
            "Content-Range",
            format!("bytes 0-{}/{}", CHUNK_ALIGNMENT - 1, total).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(308).insert_header("Range", format!("bytes=0-{}", CHUNK_ALIGNMENT - 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/session/s1"))
        .and(header(
            "Content-Range",
            format!("bytes {}-{}/{}", CHUNK_ALIGNMENT, total - 1, total).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::binary_json(
            "new-1",
            "notes.txt",
            "folder-1",
            "d41d8cd98f00b204e9800998ecf8427e",
            total as u64,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let (progress, seen) = recorder();
    let node = upload::upload_file(
        &client,
        &id("folder-1"),
        "notes.txt",
        "text/plain",
        &data,
        CHUNK_ALIGNMENT,
        Some(&progress),
    )
    .await
    .expect("upload failed");

    assert_eq!(node.id.as_str(), "new-1");
    assert!(node.has_parent(&id("folder-1")));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0] < seen[1]);
    assert_eq!(seen[1], 1.0);
}

#[tokio::test]
async fn test_upload_empty_file() {
    let (server, client) = common::setup_drive_mock().await;
    let session_url = format!("{}/session/empty", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/empty"))
        .and(header("Content-Range", "bytes */0"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::binary_json(
            "new-empty",
            "empty.txt",
            "root",
            "d41d8cd98f00b204e9800998ecf8427e",
            0,
        )))
        .mount(&server)
        .await;

    let node = common::store(client)
        .create_file(&RemoteId::root(), "empty.txt", "text/plain", &[], None)
        .await
        .unwrap();

    assert_eq!(node.size, Some(0));
}

#[tokio::test]
async fn test_upload_session_without_location_fails() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = common::store(client)
        .create_file(&RemoteId::root(), "a.txt", "text/plain", b"abc", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_upload_rejected_by_quota() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The user's Drive storage quota has been exceeded." }
        })))
        .mount(&server)
        .await;

    let err = common::store(client)
        .create_file(&RemoteId::root(), "a.txt", "text/plain", b"abc", None)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("storage quota"));
}

// ============================================================================
// Delete tests
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/files/file-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    common::store(client)
        .delete_file(&id("file-1"))
        .await
        .expect("delete failed");
}

#[tokio::test]
async fn test_delete_missing_file() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("DELETE"))
        .and(path("/files/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = common::store(client)
        .delete_file(&id("missing"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::NotFound(_))
    ));
}
