//! Database-backed job lock shared by every instance using the same database

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use tracing::debug;
use uuid::Uuid;

use super::{JobLock, LockLease, LockPolicy, Result};

/// Row lease in the `scheduler_lock` table (created by the schema migration).
///
/// Acquisition is a single conditional upsert, so two instances racing for an
/// expired lease cannot both win. The statements use SQLite placeholders and
/// upsert syntax; other backends are rejected by config validation.
#[derive(Debug, Clone)]
pub struct DbJobLock {
	conn: DatabaseConnection,
	holder: String,
}

impl DbJobLock {
	pub fn new(conn: DatabaseConnection) -> Self {
		Self::with_holder(conn, format!("mo-{}", Uuid::new_v4()))
	}

	pub fn with_holder(conn: DatabaseConnection, holder: impl Into<String>) -> Self {
		Self {
			conn,
			holder: holder.into(),
		}
	}
}

/// Fixed-width UTC timestamps so that text comparison orders them correctly
fn timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl JobLock for DbJobLock {
	async fn try_acquire(&self, name: &str, policy: LockPolicy) -> Result<Option<LockLease>> {
		let locked_at = Utc::now();
		let lock_until = policy.lease_until(locked_at)?;

		let result = self
			.conn
			.execute(Statement::from_sql_and_values(
				self.conn.get_database_backend(),
				r#"
				INSERT INTO scheduler_lock (name, lock_until, locked_at, locked_by)
				VALUES (?, ?, ?, ?)
				ON CONFLICT (name) DO UPDATE SET
					lock_until = excluded.lock_until,
					locked_at = excluded.locked_at,
					locked_by = excluded.locked_by
				WHERE scheduler_lock.lock_until <= excluded.locked_at
				"#,
				vec![
					name.into(),
					timestamp(lock_until).into(),
					timestamp(locked_at).into(),
					self.holder.clone().into(),
				],
			))
			.await?;

		if result.rows_affected() == 0 {
			debug!(lock = name, "Lock is held elsewhere;");
			return Ok(None);
		}

		Ok(Some(LockLease {
			name: name.to_string(),
			holder: self.holder.clone(),
			locked_at,
			lock_until,
			policy,
		}))
	}

	async fn release(&self, lease: LockLease) -> Result<()> {
		let until = lease.policy.release_until(lease.locked_at, Utc::now())?;

		self.conn
			.execute(Statement::from_sql_and_values(
				self.conn.get_database_backend(),
				r#"
				UPDATE scheduler_lock SET lock_until = ?
				WHERE name = ? AND locked_by = ? AND locked_at = ?
				"#,
				vec![
					timestamp(until).into(),
					lease.name.into(),
					lease.holder.into(),
					timestamp(lease.locked_at).into(),
				],
			))
			.await?;

		Ok(())
	}
}
