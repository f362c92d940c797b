//! drivesync GDrive - Google Drive v3 API client
//!
//! Provides async client for:
//! - Paginated child listings and name lookups, scoped to files the
//!   authenticated user owns and that are not in the trash
//! - Ranged downloads of binary files and exports of native documents
//! - Resumable uploads into a parent folder
//! - Permanent deletion and metadata queries
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and status mapping
//! - [`download`] - Ranged downloads and document exports
//! - [`files`] - Drive file resource and its conversion to domain nodes
//! - [`listing`] - Child listings, name lookups and metadata
//! - [`provider`] - `IRemoteStore` implementation
//! - [`query`] - Search query construction
//! - [`upload`] - Resumable upload sessions

pub mod client;
pub mod download;
pub mod files;
pub mod listing;
pub mod provider;
pub mod query;
pub mod upload;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// The access token is missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions, or a quota was exceeded
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested file does not exist or is not visible to the user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other unsuccessful status
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DriveError {
    /// Maps an unsuccessful HTTP status and its body to an error
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        match status.as_u16() {
            401 => DriveError::Unauthorized(message),
            403 => DriveError::Forbidden(message),
            404 => DriveError::NotFound(message),
            429 => DriveError::TooManyRequests(message),
            code @ 500..=599 => DriveError::ServerError {
                status: code,
                message,
            },
            code => DriveError::ApiError {
                status: code,
                message,
            },
        }
    }
}

/// Extracts `error.message` from a Drive error body, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
