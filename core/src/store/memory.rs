//! In-memory store
//!
//! All state sits behind one mutex, so each commit is applied as a whole while
//! no other reader or writer can observe it half done.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PartitionCommit, Result, StoreError, SyncStore};
use crate::domain::{
	Offence, Partition, PartitionLoadHistory, PartitionLoadStatus, StoredOffence,
};

#[derive(Debug, Default)]
struct State {
	offences: BTreeMap<String, StoredOffence>,
	last_id: i64,
	statuses: BTreeMap<Partition, PartitionLoadStatus>,
	history: Vec<PartitionLoadHistory>,
}

impl State {
	fn upsert(&mut self, offence: Offence) {
		match self.offences.get_mut(&offence.code) {
			Some(stored) => stored.offence = offence,
			None => {
				self.last_id += 1;
				self.offences.insert(
					offence.code.clone(),
					StoredOffence {
						id: self.last_id,
						offence,
					},
				);
			}
		}
	}
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	state: Mutex<State>,
}

impl MemoryStore {
	/// A store with a fresh status row for every partition
	pub fn provisioned() -> Self {
		Self::with_partitions(Partition::all())
	}

	/// A store with status rows for the given partitions only
	pub fn with_partitions(partitions: impl IntoIterator<Item = Partition>) -> Self {
		let statuses = partitions
			.into_iter()
			.map(|partition| (partition, PartitionLoadStatus::provisioned(partition)))
			.collect();

		Self {
			state: Mutex::new(State {
				statuses,
				..Default::default()
			}),
		}
	}

	/// Overwrite a partition's status row
	pub async fn put_load_status(&self, status: PartitionLoadStatus) {
		self.state
			.lock()
			.await
			.statuses
			.insert(status.partition, status);
	}

	/// Upsert an offence outside of any sync attempt
	pub async fn put_offence(&self, offence: Offence) {
		self.state.lock().await.upsert(offence);
	}
}

#[async_trait]
impl SyncStore for MemoryStore {
	async fn delete_all_offences(&self) -> Result<u64> {
		let mut state = self.state.lock().await;
		let removed = state.offences.len() as u64;
		state.offences.clear();
		Ok(removed)
	}

	async fn commit_attempt(&self, commit: PartitionCommit) -> Result<()> {
		let mut state = self.state.lock().await;
		let partition = commit.attempt.partition;

		if !state.statuses.contains_key(&partition) {
			return Err(StoreError::PartitionNotProvisioned(partition));
		}

		for offence in commit.offences {
			state.upsert(offence);
		}

		let history = state
			.statuses
			.get_mut(&partition)
			.ok_or(StoreError::PartitionNotProvisioned(partition))?
			.record(&commit.attempt);
		state.history.push(history);

		Ok(())
	}

	async fn list_load_statuses(&self) -> Result<Vec<PartitionLoadStatus>> {
		Ok(self.state.lock().await.statuses.values().cloned().collect())
	}

	async fn find_offence(&self, code: &str) -> Result<Option<StoredOffence>> {
		Ok(self.state.lock().await.offences.get(code).cloned())
	}

	async fn list_offences(&self) -> Result<Vec<StoredOffence>> {
		Ok(self.state.lock().await.offences.values().cloned().collect())
	}

	async fn load_history(&self) -> Result<Vec<PartitionLoadHistory>> {
		Ok(self.state.lock().await.history.clone())
	}
}
