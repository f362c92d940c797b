//! Child listings, name lookups and metadata
//!
//! Wraps `files.list` and `files.get`. Listings return one page per call;
//! name lookups follow page tokens until the result set is complete.

use reqwest::Method;
use tracing::{debug, instrument};

use drivesync_core::domain::newtypes::{PageToken, RemoteId};
use drivesync_core::domain::{NodeKind, RemoteNode};
use drivesync_core::ports::ListPage;

use crate::client::DriveClient;
use crate::files::{DriveFile, FileList, FILE_FIELDS};
use crate::query;
use crate::DriveError;

fn list_fields() -> String {
    format!("nextPageToken,files({FILE_FIELDS})")
}

/// Issues one `files.list` request
async fn list_page(
    client: &DriveClient,
    q: &str,
    page_token: Option<&str>,
) -> Result<FileList, DriveError> {
    let page_size = client.page_size().to_string();
    let fields = list_fields();
    let mut params = vec![
        ("q", q),
        ("fields", fields.as_str()),
        ("pageSize", page_size.as_str()),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token));
    }

    client
        .send_json(client.request(Method::GET, "/files").query(&params))
        .await
}

fn into_nodes(files: Vec<DriveFile>) -> Result<Vec<RemoteNode>, DriveError> {
    files.into_iter().map(RemoteNode::try_from).collect()
}

/// Lists one page of the owned, non-trashed children of `container`
#[instrument(skip(client), fields(container = %container))]
pub async fn list_children(
    client: &DriveClient,
    container: &RemoteId,
    page_token: Option<&PageToken>,
) -> Result<ListPage, DriveError> {
    let q = query::children_of(container);
    let list = list_page(client, &q, page_token.map(PageToken::as_str)).await?;

    let next_page_token = list
        .next_page_token
        .filter(|t| !t.is_empty())
        .map(PageToken::new)
        .transpose()
        .map_err(|e| DriveError::InvalidResponse(format!("nextPageToken: {e}")))?;
    let items = into_nodes(list.files)?;

    debug!(items = items.len(), more = next_page_token.is_some(), "Listed page");
    Ok(ListPage {
        items,
        next_page_token,
    })
}

/// Finds every owned, non-trashed node called `name`
///
/// Results are in listing order; callers that need a single match take the
/// first one.
#[instrument(skip(client))]
pub async fn find_by_name(
    client: &DriveClient,
    name: &str,
    parent: Option<&RemoteId>,
    kind: Option<NodeKind>,
) -> Result<Vec<RemoteNode>, DriveError> {
    let q = query::by_name(name, parent, kind);
    let mut nodes = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let list = list_page(client, &q, token.as_deref()).await?;
        nodes.extend(into_nodes(list.files)?);
        match list.next_page_token.filter(|t| !t.is_empty()) {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(matches = nodes.len(), "Name lookup complete");
    Ok(nodes)
}

/// Fetches the metadata of a single file or folder
#[instrument(skip(client), fields(id = %id))]
pub async fn get_metadata(client: &DriveClient, id: &RemoteId) -> Result<RemoteNode, DriveError> {
    let file: DriveFile = client
        .send_json(
            client
                .request(Method::GET, &format!("/files/{}", id.as_str()))
                .query(&[("fields", FILE_FIELDS)]),
        )
        .await?;
    RemoteNode::try_from(file)
}
