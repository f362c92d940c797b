//! Depth-first walk of the remote hierarchy
//!
//! Lists each container page by page and hands every file to the
//! [`Reconciler`]. Traversal uses an explicit stack of frames; the visit
//! order is the same as a recursive walk that finishes every child subtree
//! before requesting the next page of the parent.
//!
//! Nodes with several parents are visited once per path.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, instrument};

use drivesync_core::domain::newtypes::{PageToken, RelativePath, RemoteId};
use drivesync_core::domain::{IssueKind, RemoteNode, ScanIssue};
use drivesync_core::ports::IRemoteStore;

use crate::reconciler::Reconciler;
use crate::SyncError;

/// Counters collected during a remote walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteWalkStats {
    pub containers: u64,
    pub files: u64,
    pub pages: u64,
}

/// One container being listed
struct Frame {
    container: RemoteId,
    path: RelativePath,
    pending: VecDeque<RemoteNode>,
    next_token: Option<PageToken>,
    started: bool,
}

impl Frame {
    fn new(container: RemoteId, path: RelativePath) -> Self {
        Self {
            container,
            path,
            pending: VecDeque::new(),
            next_token: None,
            started: false,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.started && self.pending.is_empty() && self.next_token.is_none()
    }
}

/// Walks a remote container tree
pub struct RemoteTreeWalker {
    remote_store: Arc<dyn IRemoteStore>,
}

impl RemoteTreeWalker {
    pub fn new(remote_store: Arc<dyn IRemoteStore>) -> Self {
        Self { remote_store }
    }

    /// Walk everything below `root`, reporting files relative to `root_path`
    ///
    /// # Errors
    ///
    /// Only a failure to list `root` itself is returned. Failures below it
    /// are recorded against the container's path and its subtree is skipped.
    #[instrument(skip(self, reconciler), fields(root = %root))]
    pub async fn walk(
        &self,
        root: &RemoteId,
        root_path: RelativePath,
        reconciler: &mut Reconciler,
    ) -> Result<RemoteWalkStats> {
        let mut stats = RemoteWalkStats::default();
        let mut stack = vec![Frame::new(root.clone(), root_path)];
        stats.containers += 1;

        while let Some(top) = stack.len().checked_sub(1) {
            if stack[top].is_exhausted() {
                stack.pop();
                continue;
            }

            if let Some(child) = stack[top].pending.pop_front() {
                let parent_path = &stack[top].path;
                let child_path = match parent_path.join(&child.name) {
                    Ok(path) => path,
                    Err(e) => {
                        reconciler.record_issue(ScanIssue::new(
                            parent_path.clone(),
                            IssueKind::InvalidName,
                            format!("remote {} '{}' ({}): {e}", child.kind, child.name, child.id),
                        ));
                        continue;
                    }
                };

                if child.is_container() {
                    debug!(path = %child_path, id = %child.id, "Descending");
                    stats.containers += 1;
                    stack.push(Frame::new(child.id, child_path));
                } else {
                    stats.files += 1;
                    reconciler.classify(&child_path, &child).await;
                }
                continue;
            }

            // Current page consumed; fetch the next one
            let frame = &mut stack[top];
            let token = frame.next_token.take();
            match self
                .remote_store
                .list_children(&frame.container, token.as_ref())
                .await
            {
                Ok(page) => {
                    stats.pages += 1;
                    if !frame.started && page.is_empty_listing() {
                        reconciler.record_empty_folder(frame.path.clone());
                    }
                    frame.started = true;
                    frame.next_token = page.next_page_token;
                    frame.pending.extend(page.items);
                }
                Err(e) if top == 0 => {
                    return Err(SyncError::RemoteRootUnavailable {
                        id: frame.container.to_string(),
                        reason: format!("{e:#}"),
                    }
                    .into());
                }
                Err(e) => {
                    reconciler.record_issue(ScanIssue::new(
                        frame.path.clone(),
                        IssueKind::RemoteRequest,
                        format!("listing failed: {e:#}"),
                    ));
                    stack.pop();
                }
            }
        }

        info!(
            containers = stats.containers,
            files = stats.files,
            pages = stats.pages,
            "Remote walk complete"
        );
        Ok(stats)
    }
}
