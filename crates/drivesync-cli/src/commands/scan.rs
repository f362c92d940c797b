//! Scan command - compare the local folder with Drive

use anyhow::Result;
use clap::Args;

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::DiffReport;
use drivesync_sync::engine::ScanResult;

use super::GlobalArgs;
use crate::app::App;
use crate::output::OutputFormatter;

/// Compare the local folder with the remote folder; nothing is written
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Remote folder id to compare against (default: sync.remote_root)
    #[arg(long)]
    pub root_id: Option<String>,

    /// How local entries are matched to remote ones: prefetch or per_entry
    #[arg(long)]
    pub local_lookup: Option<LocalLookup>,
}

impl ScanCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let app = args.connect()?.with_remote_root(self.root_id.clone())?;

        let result = run_scan(&app, self.local_lookup).await?;
        print_scan(&result, args.format.is_json(), formatter.as_ref());
        Ok(())
    }
}

/// Runs phase 1 against the roots of `app`
pub async fn run_scan(app: &App, lookup: Option<LocalLookup>) -> Result<ScanResult> {
    app.scan_engine(lookup)
        .scan_with_stats(&app.sync_root, &app.remote_root)
        .await
}

pub fn print_scan(result: &ScanResult, json: bool, formatter: &dyn OutputFormatter) {
    if json {
        formatter.print_json(&scan_json(result));
        return;
    }

    let report = &result.report;
    if report.is_clean() {
        formatter.success("Local folder and Drive are in sync");
    } else {
        formatter.success(&summary_line(report));
    }
    for (title, items) in report_sections(report) {
        formatter.section(title, &items);
    }
    formatter.info(&format!(
        "Visited {} remote folders ({} pages) and {} local directories in {}ms",
        result.remote.containers, result.remote.pages, result.local.directories, result.duration_ms
    ));
}

fn scan_json(result: &ScanResult) -> serde_json::Value {
    serde_json::json!({
        "report": result.report,
        "stats": {
            "remote_containers": result.remote.containers,
            "remote_files": result.remote.files,
            "remote_pages": result.remote.pages,
            "local_directories": result.local.directories,
            "local_files": result.local.files,
            "remote_requests": result.local.remote_requests,
            "duration_ms": result.duration_ms,
        },
    })
}

pub fn summary_line(report: &DiffReport) -> String {
    format!(
        "Scan complete: {} new on remote, {} new on local, {} updated, {} unverifiable, {} errors",
        report.new_on_remote.len(),
        report.new_on_local.len(),
        report.updated.len(),
        report.unverifiable.len(),
        report.errors.len()
    )
}

/// Titled path lists of a report, in display order
pub fn report_sections(report: &DiffReport) -> Vec<(&'static str, Vec<String>)> {
    let paths = |list: Vec<&str>| list.into_iter().map(str::to_string).collect::<Vec<_>>();

    vec![
        ("Only on Drive", paths(report.new_on_remote_paths())),
        ("Only in local folder", paths(report.new_on_local_paths())),
        ("Content differs", paths(report.updated_paths())),
        (
            "Native documents (cannot be compared)",
            paths(report.unverifiable_paths()),
        ),
        (
            "Errors",
            report
                .errors
                .iter()
                .map(|e| format!("{}: {} ({})", e.path, e.reason, e.kind))
                .collect(),
        ),
        ("Empty remote folders", paths(report.empty_folder_paths())),
    ]
}
