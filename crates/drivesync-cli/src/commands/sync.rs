//! Sync command - batch resolution with an explicit policy

use anyhow::Result;
use clap::{Args, ValueEnum};

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::Decision;
use drivesync_sync::resolver::{BatchResolver, BatchSummary, SyncPolicy};

use super::resolve::{outcomes_json, report_outcome};
use super::scan::{print_scan, run_scan};
use super::{progress_observer, GlobalArgs};
use crate::output::OutputFormatter;

/// What to do with files that only exist on Drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteOnlyAction {
    Download,
    Delete,
    Skip,
}

impl From<RemoteOnlyAction> for Decision {
    fn from(action: RemoteOnlyAction) -> Self {
        match action {
            RemoteOnlyAction::Download => Decision::Download,
            RemoteOnlyAction::Delete => Decision::DeleteRemote,
            RemoteOnlyAction::Skip => Decision::Skip,
        }
    }
}

/// What to do with files that only exist locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocalOnlyAction {
    Upload,
    Skip,
}

impl From<LocalOnlyAction> for Decision {
    fn from(action: LocalOnlyAction) -> Self {
        match action {
            LocalOnlyAction::Upload => Decision::Upload,
            LocalOnlyAction::Skip => Decision::Skip,
        }
    }
}

/// Scan, then apply one decision per category to every difference
///
/// Files whose content differs and native documents are reported only.
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Decision for files that only exist on Drive
    #[arg(long, value_enum)]
    pub remote_only: RemoteOnlyAction,

    /// Decision for files that only exist locally
    #[arg(long, value_enum)]
    pub local_only: LocalOnlyAction,

    /// Remote folder id to compare against (default: sync.remote_root)
    #[arg(long)]
    pub root_id: Option<String>,

    /// How local entries are matched to remote ones: prefetch or per_entry
    #[arg(long)]
    pub local_lookup: Option<LocalLookup>,

    /// Show what would be done without transferring anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let policy = SyncPolicy::new(self.remote_only.into(), self.local_only.into())?;
        let app = args.connect()?.with_remote_root(self.root_id.clone())?;

        let result = run_scan(&app, self.local_lookup).await?;
        if self.dry_run {
            print_scan(&result, args.format.is_json(), formatter.as_ref());
            formatter.info(&format!(
                "Dry run: {} for files only on Drive, {} for files only in the local folder",
                policy.remote_only, policy.local_only
            ));
            return Ok(());
        }
        if !args.format.is_json() {
            print_scan(&result, false, formatter.as_ref());
        }

        let resolver = BatchResolver::new(app.resolver().with_observer(progress_observer()));
        let summary = resolver.resolve(&result.report, policy).await?;

        print_summary(&summary, args.format.is_json(), formatter.as_ref());
        Ok(())
    }
}

fn print_summary(summary: &BatchSummary, json: bool, formatter: &dyn OutputFormatter) {
    if json {
        formatter.print_json(&serde_json::json!({
            "resolved": summary.resolved,
            "skipped": summary.skipped,
            "failed": summary.failed,
            "outcomes": outcomes_json(&summary.outcomes),
        }));
        return;
    }

    for outcome in summary.outcomes.iter().filter(|o| o.state.is_resolved()) {
        report_outcome(outcome, formatter);
    }
    for outcome in summary.failures() {
        report_outcome(outcome, formatter);
    }
    formatter.success(&format!(
        "Sync finished: {} resolved, {} skipped, {} failed",
        summary.resolved, summary.skipped, summary.failed
    ));
    if summary.failed > 0 {
        formatter.warn("Failed entries are picked up again by the next scan");
    }
}
