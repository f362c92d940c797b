//! End-to-end scan scenarios

use std::sync::Arc;

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::{ContainerMapping, IssueKind};
use drivesync_sync::SyncError;
use tempfile::TempDir;

use crate::common::{self, id, write_local, InMemoryRemote};

#[tokio::test]
async fn test_empty_roots_report_empty_folder_only() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryRemote::new());

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.empty_folder_paths(), vec!["/"]);
}

#[tokio::test]
async fn test_identical_content_is_not_classified() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/docs/a.txt", b"alpha");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(report.empty_folders.is_empty());
}

#[tokio::test]
async fn test_differing_content_is_updated() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/docs/a.txt", b"local edit");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.updated_paths(), vec!["/docs/a.txt"]);
    assert!(report.new_on_remote.is_empty());
    assert!(report.new_on_local.is_empty());
}

#[tokio::test]
async fn test_one_sided_files() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/notes/c.txt", b"charlie");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f2", "b.txt", &["d1"], b"bravo");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.new_on_remote_paths(), vec!["/docs/b.txt"]);
    assert_eq!(report.new_on_local_paths(), vec!["/notes/c.txt"]);
    assert_eq!(report.new_on_local[0].parent, ContainerMapping::Unmapped);
    assert!(report.updated.is_empty());
}

#[tokio::test]
async fn test_local_file_in_mapped_folder_keeps_container() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/docs/c.txt", b"charlie");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.new_on_local_paths(), vec!["/docs/c.txt"]);
    assert_eq!(report.new_on_local[0].parent, ContainerMapping::Mapped(id("d1")));
    assert_eq!(report.new_on_remote_paths(), vec!["/docs/a.txt"]);
}

#[tokio::test]
async fn test_failed_listing_is_isolated() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/open/a.txt", b"alpha");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "locked", "root")
        .file("f1", "secret.txt", &["d1"], b"secret")
        .folder("d2", "open", "root")
        .file("f2", "a.txt", &["d2"], b"changed remotely")
        .file("f3", "b.txt", &["d2"], b"bravo")
        .fail_listing("d1");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.error_paths(), vec!["/locked"]);
    assert_eq!(report.errors[0].kind, IssueKind::RemoteRequest);
    assert_eq!(report.updated_paths(), vec!["/open/a.txt"]);
    assert_eq!(report.new_on_remote_paths(), vec!["/open/b.txt"]);
}

#[tokio::test]
async fn test_failed_listing_with_local_directory_is_reported_once() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/locked/x.txt", b"local copy");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "locked", "root")
        .file("f1", "x.txt", &["d1"], b"local copy")
        .fail_listing("d1");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.error_paths(), vec!["/locked"]);
    assert!(report.new_on_local.is_empty());
}

#[tokio::test]
async fn test_local_file_named_like_remote_folder_is_new_on_local() {
    for strategy in [LocalLookup::Prefetch, LocalLookup::PerEntry] {
        let dir = TempDir::new().unwrap();
        write_local(dir.path(), "/docs", b"plain file");
        let remote = Arc::new(InMemoryRemote::new());
        remote.folder("d1", "docs", "root");

        let report = common::engine(&remote, strategy)
            .scan(&common::sync_root(&dir), &id("root"))
            .await
            .unwrap();

        assert_eq!(report.new_on_local_paths(), vec!["/docs"], "{strategy:?}");
        assert_eq!(report.new_on_local[0].parent, ContainerMapping::Mapped(id("root")));
    }
}

#[tokio::test]
async fn test_native_document_is_unverifiable() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/Plan", b"old export");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .native_doc("g1", "Plan", "root")
        .native_doc("g2", "Budget", "root");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.unverifiable_paths(), vec!["/Plan"]);
    assert_eq!(report.new_on_remote_paths(), vec!["/Budget"]);
    assert!(report.updated.is_empty());
}

#[tokio::test]
async fn test_multi_parent_file_reported_per_path() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("da", "a", "root")
        .folder("db", "b", "root")
        .file("shared", "shared.txt", &["da", "db"], b"shared");

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(
        report.new_on_remote_paths(),
        vec!["/a/shared.txt", "/b/shared.txt"]
    );
}

#[tokio::test]
async fn test_paginated_walk_keeps_depth_first_order() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryRemote::with_page_size(1));
    remote
        .folder("da", "a", "root")
        .file("f1", "1.txt", &["da"], b"one")
        .file("f2", "2.txt", &["da"], b"two")
        .file("fz", "z.txt", &["root"], b"zed")
        .folder("db", "b", "root")
        .file("f3", "3.txt", &["db"], b"three");

    let result = common::engine(&remote, LocalLookup::Prefetch)
        .scan_with_stats(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(
        result.report.new_on_remote_paths(),
        vec!["/a/1.txt", "/a/2.txt", "/z.txt", "/b/3.txt"]
    );
    assert_eq!(result.remote.containers, 3);
    assert_eq!(result.remote.files, 4);
}

#[tokio::test]
async fn test_repeated_scans_are_identical() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/docs/a.txt", b"local edit");
    write_local(dir.path(), "/notes/c.txt", b"charlie");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha")
        .file("f2", "b.txt", &["d1"], b"bravo")
        .folder("d3", "empty", "root");

    let engine = common::engine(&remote, LocalLookup::Prefetch);
    let root = common::sync_root(&dir);
    let first = engine.scan(&root, &id("root")).await.unwrap();
    let second = engine.scan(&root, &id("root")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.empty_folder_paths(), vec!["/empty"]);
}

#[tokio::test]
async fn test_remote_root_failure_stops_scan() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(InMemoryRemote::new());
    remote.fail_listing("root");

    let err = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::RemoteRootUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_missing_local_root_stops_scan() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-there");
    let remote = Arc::new(InMemoryRemote::new());

    let err = common::engine(&remote, LocalLookup::PerEntry)
        .scan(
            &drivesync_core::domain::newtypes::SyncPath::new(missing).unwrap(),
            &id("root"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::LocalRootUnavailable { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinks_are_not_followed() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/real/a.txt", b"alpha");
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
    let remote = Arc::new(InMemoryRemote::new());

    let report = common::engine(&remote, LocalLookup::Prefetch)
        .scan(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(report.new_on_local_paths(), vec!["/real/a.txt"]);
}
