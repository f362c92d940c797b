//! Integration tests for listings, lookups and metadata

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::domain::NodeKind;
use drivesync_core::ports::IRemoteStore;
use drivesync_gdrive::DriveError;

use crate::common::{self, FOLDER_MIME};

const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

fn root_children_query() -> &'static str {
    "'me' in owners and trashed = false and 'root' in parents"
}

#[tokio::test]
async fn test_list_children_single_page() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_page(
        &server,
        root_children_query(),
        None,
        json!([
            common::file_json("folder-1", "docs", FOLDER_MIME, "root"),
            common::binary_json("file-1", "a.txt", "root", HELLO_MD5, 5),
        ]),
        None,
    )
    .await;

    let page = common::store(client)
        .list_children(&RemoteId::root(), None)
        .await
        .expect("listing failed");

    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].is_container());
    assert_eq!(page.items[1].content_hash.as_ref().unwrap().as_str(), HELLO_MD5);
    assert_eq!(page.items[1].size, Some(5));
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn test_list_children_follows_page_tokens() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_page(
        &server,
        root_children_query(),
        Some("page-2"),
        json!([common::binary_json("file-2", "b.txt", "root", HELLO_MD5, 5)]),
        None,
    )
    .await;
    common::mount_list_page(
        &server,
        root_children_query(),
        None,
        json!([common::binary_json("file-1", "a.txt", "root", HELLO_MD5, 5)]),
        Some("page-2"),
    )
    .await;

    let store = common::store(client);
    let first = store.list_children(&RemoteId::root(), None).await.unwrap();
    assert_eq!(first.items[0].name, "a.txt");
    let token = first.next_page_token.expect("expected a second page");
    assert_eq!(token.as_str(), "page-2");

    let second = store
        .list_children(&RemoteId::root(), Some(&token))
        .await
        .unwrap();
    assert_eq!(second.items[0].name, "b.txt");
    assert!(second.next_page_token.is_none());
}

#[tokio::test]
async fn test_empty_folder_listing() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_page(&server, root_children_query(), None, json!([]), None).await;

    let page = common::store(client)
        .list_children(&RemoteId::root(), None)
        .await
        .unwrap();

    assert!(page.is_empty_listing());
}

#[tokio::test]
async fn test_listing_error_maps_status() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_error(&server, 403, "The user does not have sufficient permissions").await;

    let err = common::store(client)
        .list_children(&RemoteId::new("locked".to_string()).unwrap(), None)
        .await
        .unwrap_err();

    match err.downcast_ref::<DriveError>() {
        Some(DriveError::Forbidden(message)) => {
            assert!(message.contains("sufficient permissions"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(format!("{err:#}").contains("Failed to list children of locked"));
}

#[tokio::test]
async fn test_unauthorized_and_server_errors() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_error(&server, 401, "Invalid Credentials").await;
    let err = common::store(client)
        .list_children(&RemoteId::root(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::Unauthorized(_))
    ));

    let (server, client) = common::setup_drive_mock().await;
    common::mount_list_error(&server, 500, "Internal Error").await;
    let err = common::store(client)
        .list_children(&RemoteId::root(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_find_by_name_escapes_and_filters_kind() {
    let (server, client) = common::setup_drive_mock().await;
    let q = "'me' in owners and trashed = false and name = 'Bob\\'s' \
             and 'root' in parents and mimeType = 'application/vnd.google-apps.folder'";
    common::mount_list_page(
        &server,
        q,
        None,
        json!([
            common::file_json("folder-a", "Bob's", FOLDER_MIME, "root"),
            common::file_json("folder-b", "Bob's", FOLDER_MIME, "root"),
        ]),
        None,
    )
    .await;

    let matches = common::store(client)
        .find_by_name("Bob's", Some(&RemoteId::root()), Some(NodeKind::Container))
        .await
        .unwrap();

    let ids: Vec<&str> = matches.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["folder-a", "folder-b"]);
}

#[tokio::test]
async fn test_find_by_name_collects_every_page() {
    let (server, client) = common::setup_drive_mock().await;
    let q = "'me' in owners and trashed = false and name = 'a.txt'";
    common::mount_list_page(
        &server,
        q,
        Some("more"),
        json!([common::binary_json("file-2", "a.txt", "folder-2", HELLO_MD5, 5)]),
        None,
    )
    .await;
    common::mount_list_page(
        &server,
        q,
        None,
        json!([common::binary_json("file-1", "a.txt", "folder-1", HELLO_MD5, 5)]),
        Some("more"),
    )
    .await;

    let matches = common::store(client)
        .find_by_name("a.txt", None, None)
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[1].id.as_str(), "file-2");
}

#[tokio::test]
async fn test_get_metadata() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/doc-1"))
        .and(query_param(
            "fields",
            "id,name,mimeType,md5Checksum,parents,size,modifiedTime",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_json(
            "doc-1",
            "Plan",
            "application/vnd.google-apps.document",
            "root",
        )))
        .mount(&server)
        .await;

    let node = common::store(client)
        .get_metadata(&RemoteId::new("doc-1".to_string()).unwrap())
        .await
        .unwrap();

    assert_eq!(node.name, "Plan");
    assert!(node.is_native_document());
    assert!(node.content_hash.is_none());
    assert!(node.has_parent(&RemoteId::root()));
}

#[tokio::test]
async fn test_get_metadata_not_found() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "File not found: missing." }
        })))
        .mount(&server)
        .await;

    let err = common::store(client)
        .get_metadata(&RemoteId::new("missing".to_string()).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriveError>(),
        Some(DriveError::NotFound(_))
    ));
}
