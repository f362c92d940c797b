//! Shared fixtures for scan integration tests
//!
//! `InMemoryRemote` is a remote store fake with Drive-like semantics: nodes
//! can have several parents, listings are paginated with a configurable page
//! size, and individual containers can be made to fail.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use md5::{Digest, Md5};
use tempfile::TempDir;

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::newtypes::{ContentHash, PageToken, RemoteId, SyncPath};
use drivesync_core::domain::{NodeKind, RemoteNode, FOLDER_MIME_TYPE};
use drivesync_core::ports::{IRemoteStore, ListPage, ProgressFn};
use drivesync_sync::engine::ScanEngine;
use drivesync_sync::filesystem::LocalFileSystemAdapter;

pub fn id(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

pub fn md5_of(data: &[u8]) -> ContentHash {
    ContentHash::new(hex::encode(Md5::digest(data))).unwrap()
}

#[derive(Default)]
struct State {
    /// Insertion order is listing order
    nodes: Vec<RemoteNode>,
    contents: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    calls: Vec<String>,
    next_id: u32,
}

pub struct InMemoryRemote {
    state: Mutex<State>,
    page_size: usize,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size,
        }
    }

    pub fn folder(&self, node_id: &str, name: &str, parent: &str) -> &Self {
        let node = RemoteNode::new(id(node_id), name, FOLDER_MIME_TYPE).with_parent(id(parent));
        self.state.lock().unwrap().nodes.push(node);
        self
    }

    pub fn file(&self, node_id: &str, name: &str, parents: &[&str], content: &[u8]) -> &Self {
        let mut node = RemoteNode::new(id(node_id), name, "text/plain")
            .with_hash(md5_of(content))
            .with_size(content.len() as u64);
        for parent in parents {
            node = node.with_parent(id(parent));
        }
        let mut state = self.state.lock().unwrap();
        state.contents.insert(node_id.to_string(), content.to_vec());
        state.nodes.push(node);
        self
    }

    pub fn native_doc(&self, node_id: &str, name: &str, parent: &str) -> &Self {
        let node = RemoteNode::new(id(node_id), name, "application/vnd.google-apps.document")
            .with_parent(id(parent));
        self.state.lock().unwrap().nodes.push(node);
        self
    }

    /// Every listing of `container` fails with a 403
    pub fn fail_listing(&self, container: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(container.to_string());
        self
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .any(|n| n.id.as_str() == node_id)
    }

    pub fn find_child(&self, parent: &str, name: &str) -> Option<RemoteNode> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| n.name == name && n.has_parent(&id(parent)))
            .cloned()
    }

    /// Remote calls made so far, e.g. `list:root` or `find:notes`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait::async_trait]
impl IRemoteStore for InMemoryRemote {
    async fn list_children(
        &self,
        container_id: &RemoteId,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list:{container_id}"));
        if state.failing.contains(container_id.as_str()) {
            bail!("HTTP 403 Forbidden");
        }

        let offset: usize = match page_token {
            Some(token) => token.as_str().parse()?,
            None => 0,
        };
        let children: Vec<RemoteNode> = state
            .nodes
            .iter()
            .filter(|n| n.has_parent(container_id))
            .cloned()
            .collect();

        let end = (offset + self.page_size).min(children.len());
        let next_page_token = if end < children.len() {
            Some(PageToken::new(end.to_string())?)
        } else {
            None
        };
        Ok(ListPage {
            items: children[offset.min(end)..end].to_vec(),
            next_page_token,
        })
    }

    async fn find_by_name(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
        kind: Option<NodeKind>,
    ) -> Result<Vec<RemoteNode>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("find:{name}"));
        if let Some(parent) = parent {
            if state.failing.contains(parent.as_str()) {
                bail!("HTTP 403 Forbidden");
            }
        }
        Ok(state
            .nodes
            .iter()
            .filter(|n| n.name == name)
            .filter(|n| parent.map_or(true, |p| n.has_parent(p)))
            .filter(|n| kind.map_or(true, |k| n.kind == k))
            .cloned()
            .collect())
    }

    async fn download(&self, file_id: &RemoteId, progress: Option<ProgressFn>) -> Result<Vec<u8>> {
        let data = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("download:{file_id}"));
            state
                .contents
                .get(file_id.as_str())
                .cloned()
                .ok_or_else(|| anyhow!("HTTP 404 Not Found"))?
        };
        if let Some(progress) = progress {
            progress(1.0);
        }
        Ok(data)
    }

    async fn export(
        &self,
        file_id: &RemoteId,
        target_mime: &str,
        progress: Option<ProgressFn>,
    ) -> Result<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("export:{file_id}"));
        if let Some(progress) = progress {
            progress(1.0);
        }
        Ok(format!("exported {file_id} as {target_mime}").into_bytes())
    }

    async fn create_file(
        &self,
        parent_id: &RemoteId,
        name: &str,
        mime_type: &str,
        data: &[u8],
        progress: Option<ProgressFn>,
    ) -> Result<RemoteNode> {
        let node = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("create:{name}"));
            state.next_id += 1;
            let node_id = format!("created-{}", state.next_id);
            let node = RemoteNode::new(id(&node_id), name, mime_type)
                .with_hash(md5_of(data))
                .with_size(data.len() as u64)
                .with_parent(parent_id.clone());
            state.contents.insert(node_id, data.to_vec());
            state.nodes.push(node.clone());
            node
        };
        if let Some(progress) = progress {
            progress(1.0);
        }
        Ok(node)
    }

    async fn delete_file(&self, file_id: &RemoteId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete:{file_id}"));
        let before = state.nodes.len();
        state.nodes.retain(|n| &n.id != file_id);
        if state.nodes.len() == before {
            bail!("HTTP 404 Not Found");
        }
        state.contents.remove(file_id.as_str());
        Ok(())
    }

    async fn get_metadata(&self, file_id: &RemoteId) -> Result<RemoteNode> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| &n.id == file_id)
            .cloned()
            .ok_or_else(|| anyhow!("HTTP 404 Not Found"))
    }
}

// ============================================================================
// Local fixtures
// ============================================================================

pub fn write_local(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn sync_root(dir: &TempDir) -> SyncPath {
    SyncPath::new(dir.path().to_path_buf()).unwrap()
}

pub fn engine(remote: &Arc<InMemoryRemote>, lookup: LocalLookup) -> ScanEngine {
    ScanEngine::new(
        Arc::clone(remote) as Arc<dyn IRemoteStore>,
        Arc::new(LocalFileSystemAdapter::new()),
        lookup,
    )
}
