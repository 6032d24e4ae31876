//! Job locks - at most one run of a periodic job across the deployment
//!
//! A lock is a named lease with a bounded hold time. Acquisition never waits:
//! a caller that cannot take the lease skips its run. On release the lease is
//! kept until `at_least_for` has elapsed since it was taken, so instances whose
//! timers fire slightly later also skip the same tick.

pub mod db;
pub mod local;

pub use db::DbJobLock;
pub use local::LocalJobLock;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
	#[error("Database error: {0}")]
	Database(#[from] sea_orm::DbErr),

	#[error("Lock duration out of range: {0}")]
	Duration(#[from] chrono::OutOfRangeError),
}

pub type Result<T> = std::result::Result<T, LockError>;

/// How long a lease may be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockPolicy {
	/// Lease expiry if the holder never releases it (crash, hang)
	#[serde(with = "humantime_serde")]
	pub at_most_for: Duration,

	/// Minimum time the lease stays taken, even after release
	#[serde(with = "humantime_serde")]
	pub at_least_for: Duration,
}

impl Default for LockPolicy {
	fn default() -> Self {
		Self {
			at_most_for: Duration::from_secs(10 * 60),
			at_least_for: Duration::from_secs(10 * 60),
		}
	}
}

impl LockPolicy {
	pub fn lease_until(&self, locked_at: DateTime<Utc>) -> Result<DateTime<Utc>> {
		Ok(locked_at + chrono::Duration::from_std(self.at_most_for)?)
	}

	/// When a lease taken at `locked_at` and released at `now` becomes free
	pub fn release_until(&self, locked_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
		Ok(now.max(locked_at + chrono::Duration::from_std(self.at_least_for)?))
	}
}

/// A held lease
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
	pub name: String,
	pub holder: String,
	pub locked_at: DateTime<Utc>,
	pub lock_until: DateTime<Utc>,
	pub policy: LockPolicy,
}

#[async_trait]
pub trait JobLock: Send + Sync {
	/// Take the named lease, or `None` if someone else holds it
	async fn try_acquire(&self, name: &str, policy: LockPolicy) -> Result<Option<LockLease>>;

	async fn release(&self, lease: LockLease) -> Result<()>;
}
