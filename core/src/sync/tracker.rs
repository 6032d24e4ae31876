//! Partition load tracking
//!
//! Status rows are mutated in place by [`PartitionLoadStatus::record`]; the
//! stores call it inside their commit so the row update, the history append
//! and the offence writes land together.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::domain::{LoadAttempt, LoadStatus, Partition, PartitionLoadHistory, PartitionLoadStatus};

impl PartitionLoadStatus {
	/// Apply an attempt to this row and return the history entry to append.
	///
	/// The checkpoint only moves on success and never moves backwards.
	pub fn record(&mut self, attempt: &LoadAttempt) -> PartitionLoadHistory {
		self.status = Some(attempt.status);
		self.load_type = Some(attempt.load_type);
		self.load_date = Some(attempt.load_date);

		if attempt.status == LoadStatus::Success {
			self.last_successful_load_date = Some(
				self.last_successful_load_date
					.map_or(attempt.load_date, |previous| previous.max(attempt.load_date)),
			);
		}

		attempt.into()
	}
}

/// Partitions grouped by their checkpoint.
///
/// The `None` group holds partitions that never loaded successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoints {
	groups: BTreeMap<Option<NaiveDateTime>, BTreeSet<Partition>>,
}

impl Checkpoints {
	pub fn group(statuses: &[PartitionLoadStatus]) -> Self {
		let mut groups: BTreeMap<_, BTreeSet<_>> = BTreeMap::new();
		for status in statuses {
			groups
				.entry(status.last_successful_load_date)
				.or_default()
				.insert(status.partition);
		}

		Self { groups }
	}

	/// Partitions without a checkpoint
	pub fn unloaded(&self) -> impl Iterator<Item = Partition> + '_ {
		self.groups.get(&None).into_iter().flatten().copied()
	}

	/// Checkpointed groups, oldest checkpoint first
	pub fn loaded(&self) -> impl Iterator<Item = (NaiveDateTime, &BTreeSet<Partition>)> {
		self.groups
			.iter()
			.filter_map(|(checkpoint, partitions)| checkpoint.map(|at| (at, partitions)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::domain::LoadType;
	use chrono::NaiveDate;
	use pretty_assertions::assert_eq;

	fn at(day: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2022, 4, day)
			.unwrap()
			.and_hms_opt(12, 0, 0)
			.unwrap()
	}

	fn attempt(status: LoadStatus, day: u32) -> LoadAttempt {
		LoadAttempt {
			partition: Partition::A,
			status,
			load_type: LoadType::Update,
			load_date: at(day),
		}
	}

	#[test]
	fn success_moves_checkpoint() {
		let mut row = PartitionLoadStatus::provisioned(Partition::A);

		let history = row.record(&attempt(LoadStatus::Success, 2));

		assert_eq!(row.status, Some(LoadStatus::Success));
		assert_eq!(row.load_type, Some(LoadType::Update));
		assert_eq!(row.load_date, Some(at(2)));
		assert_eq!(row.last_successful_load_date, Some(at(2)));
		assert_eq!(history.load_date, at(2));
		assert_eq!(history.status, LoadStatus::Success);
	}

	#[test]
	fn failure_keeps_checkpoint() {
		let mut row = PartitionLoadStatus::provisioned(Partition::A);
		row.record(&attempt(LoadStatus::Success, 2));

		row.record(&attempt(LoadStatus::Fail, 3));

		assert_eq!(row.status, Some(LoadStatus::Fail));
		assert_eq!(row.load_date, Some(at(3)));
		assert_eq!(row.last_successful_load_date, Some(at(2)));
	}

	#[test]
	fn checkpoint_never_moves_backwards() {
		let mut row = PartitionLoadStatus::provisioned(Partition::A);
		row.record(&attempt(LoadStatus::Success, 5));

		row.record(&attempt(LoadStatus::Success, 4));

		assert_eq!(row.load_date, Some(at(4)));
		assert_eq!(row.last_successful_load_date, Some(at(5)));
	}

	#[test]
	fn groups_by_checkpoint() {
		let mut a = PartitionLoadStatus::provisioned(Partition::A);
		a.last_successful_load_date = Some(at(1));
		let mut b = PartitionLoadStatus::provisioned(Partition::B);
		b.last_successful_load_date = Some(at(2));
		let mut c = PartitionLoadStatus::provisioned(Partition::C);
		c.last_successful_load_date = Some(at(1));
		let d = PartitionLoadStatus::provisioned(Partition::D);

		let checkpoints = Checkpoints::group(&[a, b, c, d]);

		assert_eq!(checkpoints.unloaded().collect::<Vec<_>>(), vec![Partition::D]);
		let loaded = checkpoints
			.loaded()
			.map(|(at, partitions)| (at, partitions.iter().copied().collect::<Vec<_>>()))
			.collect::<Vec<_>>();
		assert_eq!(
			loaded,
			vec![
				(at(1), vec![Partition::A, Partition::C]),
				(at(2), vec![Partition::B]),
			]
		);
	}
}
