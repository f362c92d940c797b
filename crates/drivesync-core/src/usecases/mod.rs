//! Use cases (interactors) for drivesync
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ResolveEntryUseCase`] - Download, delete or upload one classified entry

pub mod resolve_entry;

pub use resolve_entry::{ActionOutcome, ResolveEntryUseCase, TransferObserver};
