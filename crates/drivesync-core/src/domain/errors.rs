//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures, rejected resolution decisions, and path errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid local path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid root-relative path
    #[error("Invalid relative path: {0}")]
    InvalidRelativePath(String),

    /// Invalid hash format (expected 32 hex characters)
    #[error("Invalid hash format: {0}")]
    InvalidHash(String),

    /// Decision not allowed for the current resolution state
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted decision or target state
        to: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid page token
    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),
}
