//! Classifications and the per-entry resolution state machine
//!
//! ## State Machine
//!
//! ```text
//!   Detected(NewOnRemote) ── Download ──────► Resolved
//!                         └─ DeleteRemote ──► Resolved
//!   Detected(NewOnLocal)  ── Upload ────────► Resolved
//!   Detected(Updated)       (report only)
//!   Detected(Unverifiable)  (report only)
//!
//!   any state ── Skip ──► unchanged
//!   action error ───────► Failed (picked up again by the next scan)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DomainError;

/// How the reconciler classified one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    NewOnRemote,
    NewOnLocal,
    Updated,
    Unverifiable,
}

impl Classification {
    /// Decisions other than `Skip` this classification accepts
    pub fn actions(&self) -> &'static [Decision] {
        match self {
            Classification::NewOnRemote => &[Decision::Download, Decision::DeleteRemote],
            Classification::NewOnLocal => &[Decision::Upload],
            Classification::Updated | Classification::Unverifiable => &[],
        }
    }

    pub fn accepts(&self, decision: Decision) -> bool {
        decision == Decision::Skip || self.actions().contains(&decision)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Classification::NewOnRemote => "NewOnRemote",
            Classification::NewOnLocal => "NewOnLocal",
            Classification::Updated => "Updated",
            Classification::Unverifiable => "Unverifiable",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::NewOnRemote => write!(f, "new on remote"),
            Classification::NewOnLocal => write!(f, "new on local"),
            Classification::Updated => write!(f, "updated"),
            Classification::Unverifiable => write!(f, "unverifiable"),
        }
    }
}

/// What the caller chose to do with one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Download,
    DeleteRemote,
    Upload,
    Skip,
}

impl Decision {
    pub fn name(&self) -> &'static str {
        match self {
            Decision::Download => "Download",
            Decision::DeleteRemote => "DeleteRemote",
            Decision::Upload => "Upload",
            Decision::Skip => "Skip",
        }
    }

    /// Single-letter shortcut used at interactive prompts
    pub fn shortcut(&self) -> char {
        match self {
            Decision::Download => 'd',
            Decision::DeleteRemote => 'x',
            Decision::Upload => 'u',
            Decision::Skip => 's',
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Download => write!(f, "download"),
            Decision::DeleteRemote => write!(f, "delete remote"),
            Decision::Upload => write!(f, "upload"),
            Decision::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for Decision {
    type Err = DomainError;

    /// Accepts the full name or the shortcut letter, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "download" => Ok(Decision::Download),
            "x" | "delete" | "delete_remote" => Ok(Decision::DeleteRemote),
            "u" | "upload" => Ok(Decision::Upload),
            "s" | "skip" => Ok(Decision::Skip),
            other => Err(DomainError::ValidationFailed(format!(
                "Unknown decision: {other}"
            ))),
        }
    }
}

/// Where one report entry stands in phase 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Detected(Classification),
    Resolved(Decision),
    Failed { decision: Decision, reason: String },
}

impl ResolutionState {
    pub fn detected(classification: Classification) -> Self {
        ResolutionState::Detected(classification)
    }

    pub fn name(&self) -> String {
        match self {
            ResolutionState::Detected(c) => format!("Detected({})", c.name()),
            ResolutionState::Resolved(d) => format!("Resolved({})", d.name()),
            ResolutionState::Failed { decision, .. } => format!("Failed({})", decision.name()),
        }
    }

    /// Whether `decision` is allowed from this state
    pub fn can_apply(&self, decision: Decision) -> bool {
        if decision == Decision::Skip {
            return true;
        }

        match self {
            ResolutionState::Detected(c) => c.accepts(decision),
            ResolutionState::Resolved(_) | ResolutionState::Failed { .. } => false,
        }
    }

    /// Validate a decision before executing it
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the decision is not allowed
    pub fn check(&self, decision: Decision) -> Result<(), DomainError> {
        if self.can_apply(decision) {
            Ok(())
        } else {
            Err(DomainError::InvalidState {
                from: self.name(),
                to: decision.name().to_string(),
            })
        }
    }

    /// Record that `decision` completed; `Skip` leaves the state unchanged
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the decision is not allowed
    pub fn resolve(&mut self, decision: Decision) -> Result<(), DomainError> {
        self.check(decision)?;
        if decision != Decision::Skip {
            *self = ResolutionState::Resolved(decision);
        }
        Ok(())
    }

    /// Record that `decision` was attempted and failed
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the decision is not allowed
    pub fn fail(&mut self, decision: Decision, reason: impl Into<String>) -> Result<(), DomainError> {
        self.check(decision)?;
        *self = ResolutionState::Failed {
            decision,
            reason: reason.into(),
        };
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionState::Resolved(_))
    }
}
