//! Run reports

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{LoadType, Partition};

/// What happened to one partition during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PartitionOutcome {
	/// Recorded SUCCESS after writing `records` offences
	Loaded { records: usize },
	/// Recorded SUCCESS; the registry had nothing cached
	NoCache,
	/// Recorded FAIL
	Failed { reason: String },
	/// Nothing could be recorded (e.g. the status row is missing)
	Unrecorded { reason: String },
}

impl PartitionOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Loaded { .. } | Self::NoCache)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	pub load_type: LoadType,
	pub load_date: NaiveDateTime,
	/// Only partitions the run attempted appear here
	pub outcomes: BTreeMap<Partition, PartitionOutcome>,
}

impl SyncReport {
	pub fn new(load_type: LoadType, load_date: NaiveDateTime) -> Self {
		Self {
			load_type,
			load_date,
			outcomes: BTreeMap::new(),
		}
	}

	pub fn insert(&mut self, partition: Partition, outcome: PartitionOutcome) {
		self.outcomes.insert(partition, outcome);
	}

	pub fn outcome(&self, partition: Partition) -> Option<&PartitionOutcome> {
		self.outcomes.get(&partition)
	}

	pub fn attempted(&self) -> impl Iterator<Item = Partition> + '_ {
		self.outcomes.keys().copied()
	}

	pub fn records_written(&self) -> usize {
		self.outcomes
			.values()
			.map(|outcome| match outcome {
				PartitionOutcome::Loaded { records } => *records,
				_ => 0,
			})
			.sum()
	}

	pub fn failures(&self) -> impl Iterator<Item = (Partition, &PartitionOutcome)> {
		self.outcomes
			.iter()
			.filter(|(_, outcome)| !outcome.is_success())
			.map(|(partition, outcome)| (*partition, outcome))
	}

	pub fn is_clean(&self) -> bool {
		self.failures().next().is_none()
	}
}
