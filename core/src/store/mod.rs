//! Storage interface the sync engine depends on
//!
//! The engine never talks to a database directly. It needs exactly three
//! things: wipe all offences, list partition statuses, and commit one
//! partition attempt (offence upserts + status update + history append) as a
//! single atomic unit. The inspection reads exist for operators and tests.
//!
//! Backends: [`MemoryStore`] here, [`crate::infra::db::SqlStore`] for SeaORM.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
	LoadAttempt, Offence, Partition, PartitionLoadHistory, PartitionLoadStatus, StoredOffence,
};

#[derive(Debug, Error)]
pub enum StoreError {
	/// The status row for a partition was never provisioned
	#[error("No load status is provisioned for partition {0}")]
	PartitionNotProvisioned(Partition),

	#[error("Database error: {0}")]
	Database(#[from] sea_orm::DbErr),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Everything written by one partition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionCommit {
	pub attempt: LoadAttempt,
	/// Winning revisions, upserted by code
	pub offences: Vec<Offence>,
}

impl PartitionCommit {
	/// An attempt that writes no offences (failures and "no cache")
	pub fn status_only(attempt: LoadAttempt) -> Self {
		Self {
			attempt,
			offences: Vec::new(),
		}
	}
}

#[async_trait]
pub trait SyncStore: Send + Sync {
	/// Delete every stored offence in one operation, returning how many went
	async fn delete_all_offences(&self) -> Result<u64>;

	/// Apply a partition attempt atomically.
	///
	/// Offences are upserted by code: an existing record keeps its id and has
	/// every descriptive field replaced. The partition's status row is then
	/// updated and a history entry appended. If anything fails, nothing is
	/// written; in particular a missing status row fails with
	/// [`StoreError::PartitionNotProvisioned`] after no offence was touched.
	async fn commit_attempt(&self, commit: PartitionCommit) -> Result<()>;

	/// All partition status rows, ordered by partition key
	async fn list_load_statuses(&self) -> Result<Vec<PartitionLoadStatus>>;

	async fn find_offence(&self, code: &str) -> Result<Option<StoredOffence>>;

	/// All stored offences, ordered by code
	async fn list_offences(&self) -> Result<Vec<StoredOffence>>;

	/// Every recorded attempt, oldest first
	async fn load_history(&self) -> Result<Vec<PartitionLoadHistory>>;
}
