//! Periodic sync jobs
//!
//! Each tick takes the job's lease first. A tick that finds the lease taken,
//! here or on another instance, is skipped rather than queued. Jobs run on the
//! scheduler task itself, so the two jobs never overlap within one process and
//! a shutdown signal is only observed between runs.

use std::{future, sync::Arc, time::Duration};

use strum::Display;
use tokio::{
	sync::broadcast,
	time::{self, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use super::{Result, SchedulerError};
use crate::{
	config::ScheduleConfig,
	infra::lock::{JobLock, LockPolicy},
	sync::{SyncOrchestrator, SyncReport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SyncJob {
	FullLoad,
	Update,
}

impl SyncJob {
	/// Lease name shared by every instance running this job
	pub fn lock_name(self) -> &'static str {
		match self {
			Self::FullLoad => "offence_full_load",
			Self::Update => "offence_update",
		}
	}
}

pub struct SyncScheduler {
	orchestrator: Arc<SyncOrchestrator>,
	lock: Arc<dyn JobLock>,
	schedule: ScheduleConfig,
	policy: LockPolicy,
}

impl SyncScheduler {
	pub fn new(
		orchestrator: Arc<SyncOrchestrator>,
		lock: Arc<dyn JobLock>,
		schedule: ScheduleConfig,
		policy: LockPolicy,
	) -> Self {
		Self {
			orchestrator,
			lock,
			schedule,
			policy,
		}
	}

	/// Run `job` once under its lease.
	///
	/// Returns `None` when the lease is held elsewhere and the run was skipped.
	pub async fn run_job(&self, job: SyncJob) -> Result<Option<SyncReport>> {
		let Some(lease) = self.lock.try_acquire(job.lock_name(), self.policy).await? else {
			info!(%job, "Job is already running elsewhere, skipping;");
			return Ok(None);
		};

		debug!(%job, until = %lease.lock_until, "Acquired job lock;");

		let result = match job {
			SyncJob::FullLoad => self.orchestrator.run_full_load().await,
			SyncJob::Update => self.orchestrator.run_incremental_update().await,
		};

		// The lease expires on its own after `at_most_for` if this fails
		if let Err(e) = self.lock.release(lease).await {
			warn!(%job, ?e, "Failed to release job lock;");
		}

		Ok(Some(result.map_err(SchedulerError::from)?))
	}

	/// Tick the enabled jobs until `shutdown` fires
	pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
		let mut full_load = self
			.schedule
			.full_load_enabled
			.then(|| ticker(self.schedule.full_load_interval));
		let mut update = self
			.schedule
			.update_enabled
			.then(|| ticker(self.schedule.update_interval));

		info!(
			full_load = ?full_load.as_ref().map(|_| self.schedule.full_load_interval),
			update = ?update.as_ref().map(|_| self.schedule.update_interval),
			"Starting sync scheduler"
		);

		loop {
			tokio::select! {
				_ = next_tick(&mut full_load) => self.run_scheduled(SyncJob::FullLoad).await,
				_ = next_tick(&mut update) => self.run_scheduled(SyncJob::Update).await,
				_ = shutdown.recv() => {
					info!("Sync scheduler shutdown signal received");
					break;
				}
			}
		}
	}

	async fn run_scheduled(&self, job: SyncJob) {
		match self.run_job(job).await {
			Ok(Some(report)) if !report.is_clean() => {
				warn!(%job, failed = report.failures().count(), "Scheduled job recorded failures;")
			}
			Ok(_) => {}
			Err(e) => error!(%job, ?e, "Scheduled job failed;"),
		}
	}
}

/// First tick one period from now; late ticks are dropped, not bunched up
fn ticker(period: Duration) -> Interval {
	let mut interval = time::interval_at(Instant::now() + period, period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
	interval
}

async fn next_tick(interval: &mut Option<Interval>) {
	match interval {
		Some(interval) => {
			interval.tick().await;
		}
		None => future::pending().await,
	}
}
