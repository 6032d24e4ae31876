//! In-process job lock for single-instance deployments and tests

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{JobLock, LockLease, LockPolicy, Result};

#[derive(Debug)]
pub struct LocalJobLock {
	holder: String,
	leases: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl LocalJobLock {
	pub fn new() -> Self {
		Self {
			holder: format!("local-{}", Uuid::new_v4()),
			leases: Mutex::new(HashMap::new()),
		}
	}
}

impl Default for LocalJobLock {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl JobLock for LocalJobLock {
	async fn try_acquire(&self, name: &str, policy: LockPolicy) -> Result<Option<LockLease>> {
		let now = Utc::now();
		let mut leases = self.leases.lock().await;

		if let Some((_, until)) = leases.get(name) {
			if *until > now {
				return Ok(None);
			}
		}

		let lock_until = policy.lease_until(now)?;
		leases.insert(name.to_string(), (self.holder.clone(), lock_until));

		Ok(Some(LockLease {
			name: name.to_string(),
			holder: self.holder.clone(),
			locked_at: now,
			lock_until,
			policy,
		}))
	}

	async fn release(&self, lease: LockLease) -> Result<()> {
		let until = lease.policy.release_until(lease.locked_at, Utc::now())?;
		let mut leases = self.leases.lock().await;

		if let Some(entry) = leases.get_mut(&lease.name) {
			if entry.0 == lease.holder {
				entry.1 = until;
			}
		}

		Ok(())
	}
}
