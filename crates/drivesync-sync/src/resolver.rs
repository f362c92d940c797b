//! Batch resolution of a scan report
//!
//! Applies one decision per category to every actionable entry of a
//! [`DiffReport`]. There is no default write direction: callers must name
//! both the decision for remote-only files and the one for local-only files.
//! Updated and unverifiable entries are reported only and never touched.

use anyhow::Result;
use tracing::{info, instrument};

use drivesync_core::domain::{Classification, Decision, DiffReport};
use drivesync_core::usecases::{ActionOutcome, ResolveEntryUseCase};

use crate::SyncError;

/// Decisions applied to the two actionable categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Applied to every new-on-remote entry: download, delete or skip
    pub remote_only: Decision,
    /// Applied to every new-on-local entry: upload or skip
    pub local_only: Decision,
}

impl SyncPolicy {
    /// Builds a policy, rejecting decisions that do not fit their category
    pub fn new(remote_only: Decision, local_only: Decision) -> Result<Self, SyncError> {
        let policy = Self {
            remote_only,
            local_only,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if !Classification::NewOnRemote.accepts(self.remote_only) {
            return Err(SyncError::InvalidPolicy(format!(
                "'{}' does not apply to files that only exist remotely",
                self.remote_only
            )));
        }
        if !Classification::NewOnLocal.accepts(self.local_only) {
            return Err(SyncError::InvalidPolicy(format!(
                "'{}' does not apply to files that only exist locally",
                self.local_only
            )));
        }
        Ok(())
    }

    fn decision_for(&self, classification: Classification) -> Decision {
        match classification {
            Classification::NewOnRemote => self.remote_only,
            Classification::NewOnLocal => self.local_only,
            Classification::Updated | Classification::Unverifiable => Decision::Skip,
        }
    }
}

/// Totals of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub resolved: u32,
    pub skipped: u32,
    pub failed: u32,
    /// One outcome per report entry, in report order
    pub outcomes: Vec<ActionOutcome>,
}

impl BatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}

/// Applies a [`SyncPolicy`] to a report through [`ResolveEntryUseCase`]
pub struct BatchResolver {
    use_case: ResolveEntryUseCase,
}

impl BatchResolver {
    pub fn new(use_case: ResolveEntryUseCase) -> Self {
        Self { use_case }
    }

    /// Resolves every entry of `report` in report order
    ///
    /// A failed transfer is counted and the batch continues.
    #[instrument(skip(self, report), fields(remote_only = %policy.remote_only, local_only = %policy.local_only))]
    pub async fn resolve(&self, report: &DiffReport, policy: SyncPolicy) -> Result<BatchSummary> {
        policy.validate()?;

        let mut summary = BatchSummary::default();
        for item in report.items() {
            let decision = policy.decision_for(item.classification());
            let outcome = self.use_case.apply(item, decision).await?;

            if outcome.is_failed() {
                summary.failed += 1;
            } else if outcome.state.is_resolved() {
                summary.resolved += 1;
            } else {
                summary.skipped += 1;
            }
            summary.outcomes.push(outcome);
        }

        info!(
            resolved = summary.resolved,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch resolution complete"
        );
        Ok(summary)
    }
}
