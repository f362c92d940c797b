//! Domain entities and business logic
//!
//! This module contains the core domain types for drivesync:
//! - Newtypes for validated paths, identifiers and fingerprints
//! - Remote node descriptors
//! - The diff report produced by a scan
//! - Classifications and the resolution state machine
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod node;
pub mod report;
pub mod resolution;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use node::{NodeKind, RemoteNode, FOLDER_MIME_TYPE, NATIVE_MIME_PREFIX};
pub use report::{ContainerMapping, DiffReport, IssueKind, LocalEntry, RemoteEntry, ReportItem, ScanIssue};
pub use resolution::{Classification, Decision, ResolutionState};
