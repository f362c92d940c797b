//! Integration tests for drivesync-gdrive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies
//! end-to-end behavior of listings, lookups, downloads, exports,
//! resumable uploads and deletes.


mod test_listing;
mod test_transfers;
