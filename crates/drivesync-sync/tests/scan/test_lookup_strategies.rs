//! Prefetch and per-entry lookups must agree

use std::sync::Arc;

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::DiffReport;
use tempfile::TempDir;

use crate::common::{self, id, write_local, InMemoryRemote};

fn populated_remote(page_size: usize) -> Arc<InMemoryRemote> {
    let remote = Arc::new(InMemoryRemote::with_page_size(page_size));
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha")
        .file("f2", "b.txt", &["d1"], b"bravo")
        .folder("d2", "nested", "d1")
        .file("f3", "deep.txt", &["d2"], b"deep")
        // A file named like a local directory must not map it
        .file("f4", "photos", &["root"], b"not a folder")
        .file("f5", "readme.md", &["root"], b"readme");
    remote
}

fn populate_local(dir: &TempDir) {
    write_local(dir.path(), "/docs/a.txt", b"alpha");
    write_local(dir.path(), "/docs/c.txt", b"charlie");
    write_local(dir.path(), "/docs/nested/deep.txt", b"deep, edited");
    write_local(dir.path(), "/docs/nested/extra.txt", b"extra");
    write_local(dir.path(), "/photos/2024/beach.jpg", b"jpeg");
    write_local(dir.path(), "/readme.md", b"readme");
    write_local(dir.path(), "/todo.txt", b"todo");
}

async fn scan(remote: &Arc<InMemoryRemote>, dir: &TempDir, lookup: LocalLookup) -> DiffReport {
    common::engine(remote, lookup)
        .scan(&common::sync_root(dir), &id("root"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_strategies_produce_identical_reports() {
    let dir = TempDir::new().unwrap();
    populate_local(&dir);

    let prefetch = scan(&populated_remote(2), &dir, LocalLookup::Prefetch).await;
    let per_entry = scan(&populated_remote(2), &dir, LocalLookup::PerEntry).await;

    assert_eq!(prefetch, per_entry);
    assert_eq!(
        prefetch.new_on_local_paths(),
        vec![
            "/docs/c.txt",
            "/docs/nested/extra.txt",
            "/photos/2024/beach.jpg",
            "/todo.txt",
        ]
    );
    assert_eq!(prefetch.new_on_remote_paths(), vec!["/docs/b.txt"]);
    // Remote file vs local directory at the same path
    assert_eq!(prefetch.error_paths(), vec!["/photos"]);
    assert_eq!(prefetch.updated_paths(), vec!["/docs/nested/deep.txt"]);
}

#[tokio::test]
async fn test_unmapped_subtree_makes_no_remote_requests() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/notes/a/b/c.txt", b"c");
    write_local(dir.path(), "/notes/d.txt", b"d");
    let remote = Arc::new(InMemoryRemote::new());

    let report = scan(&remote, &dir, LocalLookup::PerEntry).await;

    assert_eq!(
        report.new_on_local_paths(),
        vec!["/notes/a/b/c.txt", "/notes/d.txt"]
    );
    // Only the lookup for "notes" itself reaches the remote
    assert_eq!(remote.count_calls("find:"), 1);
}

#[tokio::test]
async fn test_prefetch_lists_each_mapped_folder_once() {
    let dir = TempDir::new().unwrap();
    populate_local(&dir);
    let remote = populated_remote(100);

    let result = common::engine(&remote, LocalLookup::Prefetch)
        .scan_with_stats(&common::sync_root(&dir), &id("root"))
        .await
        .unwrap();

    assert_eq!(remote.count_calls("find:"), 0);
    // root, docs and nested: once in the remote walk, once in the local walk
    assert_eq!(remote.count_calls("list:"), 6);
    assert_eq!(result.local.remote_requests, 3);
}

#[tokio::test]
async fn test_lookup_failure_skips_subtree() {
    let dir = TempDir::new().unwrap();
    write_local(dir.path(), "/docs/a.txt", b"alpha");
    write_local(dir.path(), "/docs/c.txt", b"charlie");
    write_local(dir.path(), "/todo.txt", b"todo");
    let remote = Arc::new(InMemoryRemote::new());
    remote
        .folder("d1", "docs", "root")
        .file("f1", "a.txt", &["d1"], b"alpha")
        .fail_listing("d1");

    let report = scan(&remote, &dir, LocalLookup::PerEntry).await;

    // The remote walk fails on /docs, then each local lookup under it fails
    assert_eq!(report.error_paths(), vec!["/docs", "/docs/a.txt", "/docs/c.txt"]);
    assert_eq!(report.new_on_local_paths(), vec!["/todo.txt"]);
}
