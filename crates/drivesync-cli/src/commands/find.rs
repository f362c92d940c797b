//! Info and find commands - inspect remote nodes

use anyhow::Result;
use clap::Args;

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::domain::RemoteNode;

use super::GlobalArgs;
use crate::output::OutputFormatter;

/// Show the metadata of one remote node
#[derive(Debug, Args)]
pub struct InfoCommand {
    /// Remote node id
    pub id: String,
}

impl InfoCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let app = args.connect()?;
        let id = RemoteId::new(self.id.clone())?;

        let node = app.remote.get_metadata(&id).await?;

        if args.format.is_json() {
            formatter.print_json(&serde_json::to_value(&node)?);
        } else {
            print_node(&node, formatter.as_ref());
        }
        Ok(())
    }
}

/// List owned, non-trashed remote nodes with a given name
#[derive(Debug, Args)]
pub struct FindCommand {
    /// Exact node name
    pub name: String,

    /// Restrict the search to direct children of this folder id
    #[arg(long)]
    pub parent: Option<String>,
}

impl FindCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let app = args.connect()?;
        let parent = self.parent.clone().map(RemoteId::new).transpose()?;

        let nodes = app
            .remote
            .find_by_name(&self.name, parent.as_ref(), None)
            .await?;

        if args.format.is_json() {
            formatter.print_json(&serde_json::to_value(&nodes)?);
            return Ok(());
        }
        if nodes.is_empty() {
            formatter.warn(&format!("No remote node named '{}'", self.name));
            return Ok(());
        }
        formatter.success(&format!("{} match(es) for '{}'", nodes.len(), self.name));
        for node in &nodes {
            print_node(node, formatter.as_ref());
        }
        Ok(())
    }
}

fn print_node(node: &RemoteNode, formatter: &dyn OutputFormatter) {
    for line in node_lines(node) {
        formatter.info(&line);
    }
}

fn node_lines(node: &RemoteNode) -> Vec<String> {
    let parents = node
        .parent_ids
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!("{} ({})", node.name, node.kind),
        format!("  id:       {}", node.id),
        format!("  mime:     {}", node.mime_type),
        format!("  parents:  {}", if parents.is_empty() { "-" } else { parents.as_str() }),
    ];
    if let Some(size) = node.size {
        lines.push(format!("  size:     {size}"));
    }
    if let Some(hash) = &node.content_hash {
        lines.push(format!("  md5:      {hash}"));
    } else if node.is_native_document() {
        lines.push("  md5:      (native document)".to_string());
    }
    if let Some(modified) = node.modified {
        lines.push(format!("  modified: {}", modified.to_rfc3339()));
    }
    lines
}
