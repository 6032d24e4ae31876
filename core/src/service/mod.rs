//! Background services

pub mod scheduler;

pub use scheduler::{SyncJob, SyncScheduler};

use thiserror::Error;

use crate::{infra::lock::LockError, sync::SyncError};

#[derive(Debug, Error)]
pub enum SchedulerError {
	#[error("Job lock error: {0}")]
	Lock(#[from] LockError),

	#[error("Sync run failed: {0}")]
	Sync(#[from] SyncError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
