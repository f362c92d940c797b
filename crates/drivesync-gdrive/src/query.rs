//! Search query construction for `files.list`
//!
//! Every query the adapter sends is scoped to files the authenticated user
//! owns and that are not in the trash.

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::domain::{NodeKind, FOLDER_MIME_TYPE};

/// Escapes a value for use inside a single-quoted query string
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builder for a `q` parameter
#[derive(Debug, Clone)]
pub struct Query {
    clauses: Vec<String>,
}

impl Query {
    /// Owned by the current user and not trashed
    pub fn owned() -> Self {
        Self {
            clauses: vec!["'me' in owners".to_string(), "trashed = false".to_string()],
        }
    }

    #[must_use]
    pub fn in_parent(mut self, parent: &RemoteId) -> Self {
        self.clauses
            .push(format!("'{}' in parents", escape(parent.as_str())));
        self
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.clauses.push(format!("name = '{}'", escape(name)));
        self
    }

    #[must_use]
    pub fn of_kind(mut self, kind: NodeKind) -> Self {
        let op = match kind {
            NodeKind::Container => "=",
            NodeKind::File => "!=",
        };
        self.clauses
            .push(format!("mimeType {op} '{FOLDER_MIME_TYPE}'"));
        self
    }

    pub fn build(&self) -> String {
        self.clauses.join(" and ")
    }
}

/// Children of `parent`
pub fn children_of(parent: &RemoteId) -> String {
    Query::owned().in_parent(parent).build()
}

/// Nodes called `name`, optionally under `parent` and of one kind
pub fn by_name(name: &str, parent: Option<&RemoteId>, kind: Option<NodeKind>) -> String {
    let mut query = Query::owned().named(name);
    if let Some(parent) = parent {
        query = query.in_parent(parent);
    }
    if let Some(kind) = kind {
        query = query.of_kind(kind);
    }
    query.build()
}
