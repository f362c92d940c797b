//! Drive file resource
//!
//! Deserialization of the `File` resource returned by Drive v3 and its
//! conversion into the domain [`RemoteNode`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use drivesync_core::domain::newtypes::{ContentHash, RemoteId};
use drivesync_core::domain::RemoteNode;

use crate::DriveError;

/// Fields requested for every file resource
pub const FILE_FIELDS: &str = "id,name,mimeType,md5Checksum,parents,size,modifiedTime";

/// A Drive v3 file resource, limited to [`FILE_FIELDS`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Absent for folders and native documents
    pub md5_checksum: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Int64 encoded as a decimal string
    pub size: Option<String>,
    pub modified_time: Option<DateTime<Utc>>,
}

/// Response of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

impl TryFrom<DriveFile> for RemoteNode {
    type Error = DriveError;

    fn try_from(file: DriveFile) -> Result<Self, Self::Error> {
        let id = RemoteId::new(file.id)
            .map_err(|e| DriveError::InvalidResponse(format!("file id: {e}")))?;

        let mut node = RemoteNode::new(id, file.name, file.mime_type);

        if let Some(checksum) = file.md5_checksum {
            let hash = ContentHash::new(checksum)
                .map_err(|e| DriveError::InvalidResponse(format!("md5Checksum: {e}")))?;
            node = node.with_hash(hash);
        }

        for parent in file.parents {
            let parent = RemoteId::new(parent)
                .map_err(|e| DriveError::InvalidResponse(format!("parent id: {e}")))?;
            node = node.with_parent(parent);
        }

        if let Some(size) = file.size.and_then(|s| s.parse::<u64>().ok()) {
            node = node.with_size(size);
        }
        node.modified = file.modified_time;

        Ok(node)
    }
}
