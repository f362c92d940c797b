//! Depth-first walk of the local sync folder
//!
//! Resolves, top-down, the remote container each local directory maps to and
//! reports local files with no remote counterpart. Once a directory has no
//! remote match, every file below it is new on local and no further remote
//! requests are made for that subtree.
//!
//! Two lookup strategies give the same classifications:
//! - [`LocalLookup::Prefetch`] lists each mapped container once and answers
//!   every lookup in that directory from a name index.
//! - [`LocalLookup::PerEntry`] issues one name query per subdirectory and file.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::newtypes::{RelativePath, RemoteId, SyncPath};
use drivesync_core::domain::{
    ContainerMapping, IssueKind, LocalEntry, NodeKind, RemoteNode, ScanIssue,
};
use drivesync_core::ports::{DirEntry, ILocalFileSystem, IRemoteStore, LocalEntryKind};

use crate::reconciler::Reconciler;
use crate::SyncError;

/// Counters collected during a local walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalWalkStats {
    pub directories: u64,
    pub files: u64,
    pub remote_requests: u64,
}

/// Children of one remote container, by name
#[derive(Debug, Default)]
struct ChildIndex {
    by_name: HashMap<String, Vec<RemoteNode>>,
}

impl ChildIndex {
    fn insert(&mut self, node: RemoteNode) {
        self.by_name.entry(node.name.clone()).or_default().push(node);
    }

    /// First match in listing order
    fn find(&self, name: &str, kind: NodeKind) -> Option<&RemoteNode> {
        self.by_name
            .get(name)
            .and_then(|nodes| nodes.iter().find(|n| n.kind == kind))
    }
}

/// One local directory being visited
struct Frame {
    absolute: SyncPath,
    relative: RelativePath,
    mapping: ContainerMapping,
    entries: VecDeque<DirEntry>,
    index: Option<ChildIndex>,
}

/// Walks a local directory tree against the remote hierarchy
pub struct LocalTreeWalker {
    remote_store: Arc<dyn IRemoteStore>,
    local_filesystem: Arc<dyn ILocalFileSystem>,
    lookup: LocalLookup,
}

impl LocalTreeWalker {
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

    /// Walk the folder `root`, which corresponds to the remote container `root_id`
    ///
    /// # Errors
    ///
    /// Only a failure to list `root` (or, with prefetching, the remote root)
    /// is returned. Failures below it are recorded per path.
    #[instrument(skip(self, reconciler), fields(root = %root, lookup = %self.lookup))]
    pub async fn walk(
        &self,
        root: &SyncPath,
        root_id: &RemoteId,
        reconciler: &mut Reconciler,
    ) -> Result<LocalWalkStats> {
        let mut stats = LocalWalkStats::default();

        let entries = self
            .local_filesystem
            .list_dir(root)
            .await
            .map_err(|e| SyncError::LocalRootUnavailable {
                path: root.as_path().to_path_buf(),
                reason: format!("{e:#}"),
            })?;

        let index = self
            .prefetch(root_id, &mut stats)
            .await
            .context("Failed to index remote root")?;

        stats.directories += 1;
        let mut stack = vec![Frame {
            absolute: root.clone(),
            relative: RelativePath::root(),
            mapping: ContainerMapping::Mapped(root_id.clone()),
            entries: entries.into(),
            index,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            let Some(entry) = stack[top].entries.pop_front() else {
                stack.pop();
                continue;
            };

            let frame = &stack[top];
            let (absolute, relative) = match (
                frame.absolute.join(&entry.name),
                frame.relative.join(&entry.name),
            ) {
                (Ok(a), Ok(r)) => (a, r),
                (Err(e), _) | (_, Err(e)) => {
                    reconciler.record_issue(ScanIssue::new(
                        frame.relative.clone(),
                        IssueKind::InvalidName,
                        format!("local entry '{}': {e}", entry.name),
                    ));
                    continue;
                }
            };

            match entry.kind {
                LocalEntryKind::Directory => {
                    stats.directories += 1;
                    if let Some(child) = self
                        .enter_directory(&stack[top], absolute, relative, &mut stats, reconciler)
                        .await
                    {
                        stack.push(child);
                    }
                }
                LocalEntryKind::File => {
                    stats.files += 1;
                    self.visit_file(&stack[top], absolute, relative, &mut stats, reconciler)
                        .await;
                }
                LocalEntryKind::Other => {
                    debug!(path = %relative, "Skipping symlink or special file");
                }
            }
        }

        info!(
            directories = stats.directories,
            files = stats.files,
            remote_requests = stats.remote_requests,
            "Local walk complete"
        );
        Ok(stats)
    }

    /// Resolve a subdirectory's mapping and list it
    ///
    /// Returns `None` when the subtree has to be skipped.
    async fn enter_directory(
        &self,
        parent: &Frame,
        absolute: SyncPath,
        relative: RelativePath,
        stats: &mut LocalWalkStats,
        reconciler: &mut Reconciler,
    ) -> Option<Frame> {
        let name = relative.file_name().unwrap_or_default().to_string();

        let mapping = match self
            .lookup(parent, &name, NodeKind::Container, stats)
            .await
        {
            Ok(Some(node)) => ContainerMapping::Mapped(node.id),
            Ok(None) => {
                debug!(path = %relative, "No remote folder, subtree is new on local");
                ContainerMapping::Unmapped
            }
            Err(e) => {
                reconciler.record_issue(ScanIssue::new(
                    relative,
                    IssueKind::RemoteRequest,
                    format!("folder lookup failed: {e:#}"),
                ));
                return None;
            }
        };

        let entries = match self.local_filesystem.list_dir(&absolute).await {
            Ok(entries) => entries,
            Err(e) => {
                reconciler.record_issue(ScanIssue::new(
                    relative,
                    IssueKind::LocalIo,
                    format!("cannot list directory: {e:#}"),
                ));
                return None;
            }
        };

        let index = match mapping.remote_id() {
            Some(id) => match self.prefetch(id, stats).await {
                Ok(index) => index,
                Err(e) => {
                    reconciler.record_issue(ScanIssue::new(
                        relative,
                        IssueKind::RemoteRequest,
                        format!("listing failed: {e:#}"),
                    ));
                    return None;
                }
            },
            None => None,
        };

        Some(Frame {
            absolute,
            relative,
            mapping,
            entries: entries.into(),
            index,
        })
    }

    async fn visit_file(
        &self,
        parent: &Frame,
        absolute: SyncPath,
        relative: RelativePath,
        stats: &mut LocalWalkStats,
        reconciler: &mut Reconciler,
    ) {
        if parent.mapping.is_mapped() {
            let name = relative.file_name().unwrap_or_default().to_string();
            match self.lookup(parent, &name, NodeKind::File, stats).await {
                Ok(Some(_)) => return,
                Ok(None) => {}
                Err(e) => {
                    reconciler.record_issue(ScanIssue::new(
                        relative,
                        IssueKind::RemoteRequest,
                        format!("file lookup failed: {e:#}"),
                    ));
                    return;
                }
            }
        }

        reconciler.record_new_on_local(LocalEntry {
            path: relative,
            absolute_path: absolute,
            parent: parent.mapping.clone(),
        });
    }

    /// Find a child of the parent's container by name and kind
    ///
    /// Always `None` under an unmapped parent.
    async fn lookup(
        &self,
        parent: &Frame,
        name: &str,
        kind: NodeKind,
        stats: &mut LocalWalkStats,
    ) -> Result<Option<RemoteNode>> {
        let Some(container) = parent.mapping.remote_id() else {
            return Ok(None);
        };

        if let Some(index) = &parent.index {
            return Ok(index.find(name, kind).cloned());
        }

        stats.remote_requests += 1;
        let matches = self
            .remote_store
            .find_by_name(name, Some(container), Some(kind))
            .await?;
        Ok(matches.into_iter().find(|n| n.kind == kind))
    }

    /// List every page of a container into a name index (prefetch strategy only)
    async fn prefetch(
        &self,
        container: &RemoteId,
        stats: &mut LocalWalkStats,
    ) -> Result<Option<ChildIndex>> {
        if self.lookup != LocalLookup::Prefetch {
            return Ok(None);
        }

        let mut index = ChildIndex::default();
        let mut token = None;
        loop {
            stats.remote_requests += 1;
            let page = self
                .remote_store
                .list_children(container, token.as_ref())
                .await?;
            for node in page.items {
                index.insert(node);
            }
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(Some(index))
    }
}
