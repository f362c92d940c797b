//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote object store operations (Google Drive)
//! - [`ILocalFileSystem`] - Local sync folder operations and fingerprints

pub mod local_filesystem;
pub mod remote_store;

pub use local_filesystem::{DirEntry, FileSystemState, ILocalFileSystem, LocalEntryKind};
pub use remote_store::{IRemoteStore, ListPage, ProgressFn};
