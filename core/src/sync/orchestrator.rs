//! Full load and incremental update flows

use std::{collections::BTreeSet, sync::Arc};

use chrono::{Local, NaiveDateTime, SubsecRound};
use futures::{stream, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use super::{
	classify::{classify, Classification},
	reconcile::latest_of_each,
	report::{PartitionOutcome, SyncReport},
	tracker::Checkpoints,
	Result, SyncError,
};
use crate::{
	domain::{LoadAttempt, LoadStatus, LoadType, Partition},
	infra::registry::{DataSetUpdate, OffenceQuery, RegistryClient},
	store::{PartitionCommit, SyncStore},
};

/// Control table datasets carrying offences end in their partition letter
pub const OFFENCE_DATA_SET_PREFIX: &str = "offence_";

/// Partitions named by the `offence_` datasets of a control table answer
pub fn changed_partitions(updates: &[DataSetUpdate]) -> BTreeSet<Partition> {
	updates
		.iter()
		.filter(|update| update.data_set.starts_with(OFFENCE_DATA_SET_PREFIX))
		.filter_map(|update| {
			let partition = update.data_set.chars().last().and_then(Partition::from_char);
			if partition.is_none() {
				debug!(data_set = %update.data_set, "Ignoring dataset without a partition suffix;");
			}
			partition
		})
		.collect()
}

/// One partition fetch scheduled by a run
#[derive(Debug, Clone, Copy)]
struct PartitionJob {
	partition: Partition,
	load_type: LoadType,
	/// `None` fetches the whole partition
	since: Option<NaiveDateTime>,
}

pub struct SyncOrchestrator {
	registry: Arc<dyn RegistryClient>,
	store: Arc<dyn SyncStore>,
	max_concurrent_partitions: usize,
}

impl SyncOrchestrator {
	pub fn new(registry: Arc<dyn RegistryClient>, store: Arc<dyn SyncStore>) -> Self {
		Self {
			registry,
			store,
			max_concurrent_partitions: 1,
		}
	}

	/// Process up to `limit` partitions at once (at least one)
	pub fn with_max_concurrent_partitions(mut self, limit: usize) -> Self {
		self.max_concurrent_partitions = limit.max(1);
		self
	}

	/// Wipe every offence, then reload all 26 partitions
	pub async fn run_full_load(&self) -> Result<SyncReport> {
		self.run_full_load_at(now()).await
	}

	#[instrument(skip(self), err)]
	pub async fn run_full_load_at(&self, load_date: NaiveDateTime) -> Result<SyncReport> {
		let removed = self
			.store
			.delete_all_offences()
			.await
			.map_err(SyncError::Wipe)?;
		info!(removed, "Cleared offences for full load;");

		let jobs = Partition::all()
			.map(|partition| PartitionJob {
				partition,
				load_type: LoadType::FullLoad,
				since: None,
			})
			.collect();

		let mut report = SyncReport::new(LoadType::FullLoad, load_date);
		self.run_jobs(jobs, load_date, &mut report).await;
		log_summary(&report);

		Ok(report)
	}

	/// Refresh partitions the registry reports as changed since their checkpoint
	pub async fn run_incremental_update(&self) -> Result<SyncReport> {
		self.run_incremental_update_at(now()).await
	}

	#[instrument(skip(self), err)]
	pub async fn run_incremental_update_at(&self, load_date: NaiveDateTime) -> Result<SyncReport> {
		let statuses = self
			.store
			.list_load_statuses()
			.await
			.map_err(SyncError::Statuses)?;
		let checkpoints = Checkpoints::group(&statuses);

		let mut report = SyncReport::new(LoadType::Update, load_date);
		let mut jobs = Vec::new();

		for partition in checkpoints.unloaded() {
			info!(%partition, "Partition never loaded, running a full load for it in the update job;");
			jobs.push(PartitionJob {
				partition,
				load_type: LoadType::FullLoad,
				since: None,
			});
		}

		for (checkpoint, group) in checkpoints.loaded() {
			match self.changed_since(checkpoint).await {
				Ok(changed) => {
					let due = group.intersection(&changed).copied().collect::<Vec<_>>();
					info!(%checkpoint, partitions = ?due, "Partitions to update;");
					jobs.extend(due.into_iter().map(|partition| PartitionJob {
						partition,
						load_type: LoadType::Update,
						since: Some(checkpoint),
					}));
				}
				Err(reason) => {
					error!(%checkpoint, %reason, "Control table request failed, failing its partitions;");
					for &partition in group {
						let attempt = attempt(partition, LoadStatus::Fail, LoadType::Update, load_date);
						let outcome = self
							.commit(
								PartitionCommit::status_only(attempt),
								PartitionOutcome::Failed {
									reason: reason.clone(),
								},
							)
							.await;
						report.insert(partition, outcome);
					}
				}
			}
		}

		self.run_jobs(jobs, load_date, &mut report).await;
		log_summary(&report);

		Ok(report)
	}

	/// Ask the control table which partitions changed; errors come back as a reason
	async fn changed_since(&self, checkpoint: NaiveDateTime) -> std::result::Result<BTreeSet<Partition>, String> {
		let response = self
			.registry
			.get_control_table(checkpoint)
			.await
			.map_err(|e| e.to_string())?;

		if response.status.is_errored() {
			return Err(describe_status(
				response.status.code(),
				response.status.reason.as_deref(),
			));
		}

		Ok(changed_partitions(&response.payload))
	}

	async fn run_jobs(&self, jobs: Vec<PartitionJob>, load_date: NaiveDateTime, report: &mut SyncReport) {
		let outcomes = stream::iter(jobs)
			.map(|job| async move { (job.partition, self.load_partition(job, load_date).await) })
			.buffer_unordered(self.max_concurrent_partitions)
			.collect::<Vec<_>>()
			.await;

		for (partition, outcome) in outcomes {
			report.insert(partition, outcome);
		}
	}

	#[instrument(
		skip_all,
		fields(partition = %job.partition, load_type = %job.load_type)
	)]
	async fn load_partition(&self, job: PartitionJob, load_date: NaiveDateTime) -> PartitionOutcome {
		let PartitionJob {
			partition,
			load_type,
			since,
		} = job;

		let query = match since {
			Some(since) => OffenceQuery::changed_in(partition, since),
			None => OffenceQuery::all_in(partition),
		};

		let response = match self.registry.get_offences(query).await {
			Ok(response) => response,
			Err(e) => {
				error!(?e, "Request to the registry failed;");
				let attempt = attempt(partition, LoadStatus::Fail, load_type, load_date);
				return self
					.commit(
						PartitionCommit::status_only(attempt),
						PartitionOutcome::Failed {
							reason: e.to_string(),
						},
					)
					.await;
			}
		};

		match classify(&response.status) {
			Classification::Proceed => {
				let fetched = response.payload.len();
				let offences = latest_of_each(response.payload)
					.into_iter()
					.map(|revision| revision.into_offence(load_date))
					.collect::<Vec<_>>();
				let records = offences.len();
				info!(fetched, records, "Fetched offences from the registry;");

				self.commit(
					PartitionCommit {
						attempt: attempt(partition, LoadStatus::Success, load_type, load_date),
						offences,
					},
					PartitionOutcome::Loaded { records },
				)
				.await
			}
			Classification::NoCache => {
				info!("Registry has no cache for this partition, treating as success with no offences;");
				let attempt = attempt(partition, LoadStatus::Success, load_type, load_date);
				self.commit(PartitionCommit::status_only(attempt), PartitionOutcome::NoCache)
					.await
			}
			Classification::Failed { code, reason } => {
				error!(?code, ?reason, status = ?response.status, "Registry reported an error;");
				let attempt = attempt(partition, LoadStatus::Fail, load_type, load_date);
				self.commit(
					PartitionCommit::status_only(attempt),
					PartitionOutcome::Failed {
						reason: describe_status(code.as_deref(), reason.as_deref()),
					},
				)
				.await
			}
		}
	}

	/// Commit an attempt; if the store refuses, nothing was recorded
	async fn commit(&self, commit: PartitionCommit, outcome: PartitionOutcome) -> PartitionOutcome {
		let partition = commit.attempt.partition;

		match self.store.commit_attempt(commit).await {
			Ok(()) => outcome,
			Err(e) => {
				error!(%partition, ?e, "Failed to record partition attempt;");
				PartitionOutcome::Unrecorded {
					reason: e.to_string(),
				}
			}
		}
	}
}

/// Local wall-clock time at the precision the stores keep
fn now() -> NaiveDateTime {
	Local::now().naive_local().trunc_subsecs(6)
}

fn attempt(
	partition: Partition,
	status: LoadStatus,
	load_type: LoadType,
	load_date: NaiveDateTime,
) -> LoadAttempt {
	LoadAttempt {
		partition,
		status,
		load_type,
		load_date,
	}
}

fn describe_status(code: Option<&str>, reason: Option<&str>) -> String {
	match (code, reason) {
		(Some(code), Some(reason)) => format!("{code}: {reason}"),
		(Some(code), None) => code.to_string(),
		(None, Some(reason)) => reason.to_string(),
		(None, None) => "registry reported an error without a code".to_string(),
	}
}

fn log_summary(report: &SyncReport) {
	let failed = report.failures().count();
	if failed > 0 {
		warn!(
			load_type = %report.load_type,
			attempted = report.outcomes.len(),
			failed,
			records = report.records_written(),
			"Sync run finished with failures;"
		);
	} else {
		info!(
			load_type = %report.load_type,
			attempted = report.outcomes.len(),
			records = report.records_written(),
			"Sync run finished;"
		);
	}
}
