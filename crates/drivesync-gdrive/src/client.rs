//! Google Drive API client
//!
//! Provides a typed HTTP client for the Drive v3 REST API. Handles the bearer
//! header, endpoint construction for both the metadata and the upload hosts,
//! and mapping of unsuccessful statuses to [`DriveError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivesync_gdrive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new("access-token-here");
//! let response = client
//!     .send(client.request(reqwest::Method::GET, "/files/root").query(&[("fields", "id")]))
//!     .await?;
//! println!("{}", response.text().await?);
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::DriveError;

/// Base URL for Drive API v3 metadata requests
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive API v3 media uploads
pub const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Default number of items per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive API calls
///
/// Wraps `reqwest::Client` with the access token and the two base URLs the
/// Drive API uses. Requests are never retried.
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: Client,
    base_url: String,
    upload_base_url: String,
    access_token: String,
    page_size: u32,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_urls(access_token, DRIVE_BASE_URL, UPLOAD_BASE_URL)
    }

    /// Creates a new DriveClient with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token
    /// * `base_url` - Replaces `https://www.googleapis.com/drive/v3`
    /// * `upload_base_url` - Replaces `https://www.googleapis.com/upload/drive/v3`
    pub fn with_base_urls(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            upload_base_url: upload_base_url.into(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the listing page size (clamped to 1..=1000)
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request against the metadata host
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request against the upload host
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request to an absolute URL (upload sessions)
    pub fn session_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Sends a request and turns unsuccessful statuses into [`DriveError`]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        check_status(response).await
    }

    /// Sends a request and parses the JSON body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DriveError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DriveError::InvalidResponse(e.to_string()))
    }
}

/// Passes successful responses through; maps every other status
pub async fn check_status(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "Drive request failed");
    Err(DriveError::from_status(status, &body))
}
