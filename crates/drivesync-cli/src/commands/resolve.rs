//! Resolve command - scan, then ask what to do with each difference

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use drivesync_core::config::LocalLookup;
use drivesync_core::domain::{Decision, ReportItem};
use drivesync_core::usecases::ActionOutcome;

use super::scan::{print_scan, run_scan};
use super::{progress_observer, GlobalArgs};
use crate::output::OutputFormatter;

/// Scan, then prompt for a decision on every file that exists on one side only
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Remote folder id to compare against (default: sync.remote_root)
    #[arg(long)]
    pub root_id: Option<String>,

    /// How local entries are matched to remote ones: prefetch or per_entry
    #[arg(long)]
    pub local_lookup: Option<LocalLookup>,
}

impl ResolveCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let app = args.connect()?.with_remote_root(self.root_id.clone())?;

        let result = run_scan(&app, self.local_lookup).await?;
        print_scan(&result, false, formatter.as_ref());

        let use_case = app.resolver().with_observer(progress_observer());
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        let mut outcomes = Vec::new();

        for item in result.report.items() {
            if item.classification().actions().is_empty() {
                continue;
            }
            let Some(decision) = prompt_decision(&mut input, &mut output, item)? else {
                formatter.warn("Input closed; remaining entries left untouched");
                break;
            };
            let outcome = use_case.apply(item, decision).await?;
            report_outcome(&outcome, formatter.as_ref());
            outcomes.push(outcome);
        }

        if args.format.is_json() {
            formatter.print_json(&outcomes_json(&outcomes));
        }
        Ok(())
    }
}

/// Asks for a decision on `item` until the answer is one it accepts
///
/// Returns `None` when the input is exhausted.
pub fn prompt_decision<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    item: ReportItem<'_>,
) -> io::Result<Option<Decision>> {
    let classification = item.classification();
    let mut allowed = classification.actions().to_vec();
    allowed.push(Decision::Skip);

    let choices = allowed
        .iter()
        .map(|d| format!("[{}] {}", d.shortcut(), d))
        .collect::<Vec<_>>()
        .join(", ");

    loop {
        write!(output, "{} ({}): {} > ", item.path(), classification, choices)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.parse::<Decision>() {
            Ok(decision) if allowed.contains(&decision) => return Ok(Some(decision)),
            Ok(decision) => writeln!(output, "'{}' does not apply to this file", decision)?,
            Err(_) => writeln!(output, "Invalid choice '{}'", line.trim())?,
        }
    }
}

pub fn report_outcome(outcome: &ActionOutcome, formatter: &dyn OutputFormatter) {
    use drivesync_core::domain::ResolutionState;

    match &outcome.state {
        ResolutionState::Resolved(decision) => {
            formatter.success(&format!("{}: {}", outcome.path, decision));
        }
        ResolutionState::Failed { decision, reason } => {
            formatter.error(&format!("{}: {} failed: {}", outcome.path, decision, reason));
        }
        ResolutionState::Detected(_) => formatter.info(&format!("{}: skipped", outcome.path)),
    }
}

pub fn outcomes_json(outcomes: &[ActionOutcome]) -> serde_json::Value {
    serde_json::Value::Array(
        outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "path": o.path,
                    "decision": o.decision,
                    "state": o.state,
                    "created_id": o.created.as_ref().map(|n| n.id.as_str()),
                })
            })
            .collect(),
    )
}
