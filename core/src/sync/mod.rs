//! Offence sync engine
//!
//! A run walks the partitions, fetches revisions from the registry, reduces
//! them to one record per code and commits each partition's writes together
//! with its load status. Partitions are independent: one failing is recorded
//! and the run moves on.
//!
//! ```text
//! SyncOrchestrator ── RegistryClient (fetch)
//!        │
//!        ├── reconcile::latest_of_each
//!        └── SyncStore::commit_attempt ── PartitionLoadStatus::record
//! ```

pub mod classify;
pub mod orchestrator;
pub mod reconcile;
pub mod report;
pub mod tracker;

pub use classify::{classify, Classification, NO_CACHE_ERROR_CODE};
pub use orchestrator::{changed_partitions, SyncOrchestrator};
pub use reconcile::latest_of_each;
pub use report::{PartitionOutcome, SyncReport};
pub use tracker::Checkpoints;

use thiserror::Error;

use crate::store::StoreError;

/// Whole-run failures. Per-partition problems never surface here, they are in
/// the [`SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
	#[error("Failed to clear offences before full load: {0}")]
	Wipe(#[source] StoreError),

	#[error("Failed to list partition load statuses: {0}")]
	Statuses(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
