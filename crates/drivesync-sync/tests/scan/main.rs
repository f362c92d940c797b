//! Integration tests for drivesync-sync
//!
//! Runs full scans against an in-memory remote store and a temporary local
//! folder, and applies batch resolutions to the resulting reports.

mod common;

mod test_lookup_strategies;
mod test_scan_scenarios;
