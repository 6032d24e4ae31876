//! SeaORM implementation of [`SyncStore`]

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use sea_orm::{
	ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
	NotSet, QueryFilter, QueryOrder, Set, TransactionTrait, Unchanged,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::entities::{offence, sdrs_load_result, sdrs_load_result_history};
use crate::{
	domain::{
		LoadAttempt, Offence, Partition, PartitionLoadHistory, PartitionLoadStatus,
		StoredOffence,
	},
	store::{PartitionCommit, Result, StoreError, SyncStore},
};

/// Writes go through `write_gate` one at a time. SQLite refuses to upgrade a
/// deferred transaction that has already read while another one writes, so
/// concurrent partition commits would fail with `database is locked`.
#[derive(Debug, Clone)]
pub struct SqlStore {
	conn: DatabaseConnection,
	write_gate: Arc<Mutex<()>>,
}

impl SqlStore {
	pub fn new(conn: DatabaseConnection) -> Self {
		Self {
			conn,
			write_gate: Arc::new(Mutex::new(())),
		}
	}

	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}
}

fn parse_partition(alpha_char: &str) -> Option<Partition> {
	let partition = Partition::from_str(alpha_char).ok();
	if partition.is_none() {
		warn!(alpha_char, "Ignoring load status row with an unknown partition key;");
	}
	partition
}

impl From<(Partition, sdrs_load_result::Model)> for PartitionLoadStatus {
	fn from((partition, row): (Partition, sdrs_load_result::Model)) -> Self {
		Self {
			partition,
			status: row.status,
			load_type: row.load_type,
			load_date: row.load_date,
			last_successful_load_date: row.last_successful_load_date,
		}
	}
}

fn apply_offence(active: &mut offence::ActiveModel, record: Offence) {
	active.description = Set(record.description);
	active.cjs_title = Set(record.cjs_title);
	active.revision_id = Set(record.revision_id);
	active.start_date = Set(record.start_date);
	active.end_date = Set(record.end_date);
	active.home_office_stats_code = Set(record.home_office_stats_code);
	active.changed_date = Set(record.changed_date);
	active.load_date = Set(record.load_date);
}

/// Update the row for `record.code` in place, or insert it
async fn upsert_offence<C: ConnectionTrait>(conn: &C, record: Offence) -> Result<()> {
	let existing = offence::Entity::find()
		.filter(offence::Column::Code.eq(record.code.as_str()))
		.one(conn)
		.await?;

	match existing {
		Some(model) => {
			let mut active: offence::ActiveModel = model.into();
			apply_offence(&mut active, record);
			active.update(conn).await?;
		}
		None => {
			let mut active = offence::ActiveModel {
				id: NotSet,
				code: Set(record.code.clone()),
				..ActiveModelTrait::default()
			};
			apply_offence(&mut active, record);
			active.insert(conn).await?;
		}
	}

	Ok(())
}

/// Apply `attempt` to the partition's status row and append its history entry
async fn record_attempt<C: ConnectionTrait>(
	conn: &C,
	current: PartitionLoadStatus,
	attempt: &LoadAttempt,
) -> Result<()> {
	let mut status = current;
	let history = status.record(attempt);
	let alpha_char = status.partition.to_string();

	sdrs_load_result::ActiveModel {
		alpha_char: Unchanged(alpha_char.clone()),
		status: Set(status.status),
		load_type: Set(status.load_type),
		load_date: Set(status.load_date),
		last_successful_load_date: Set(status.last_successful_load_date),
	}
	.update(conn)
	.await?;

	sdrs_load_result_history::ActiveModel {
		id: NotSet,
		alpha_char: Set(alpha_char),
		status: Set(history.status),
		load_type: Set(history.load_type),
		load_date: Set(history.load_date),
	}
	.insert(conn)
	.await?;

	Ok(())
}

#[async_trait]
impl SyncStore for SqlStore {
	async fn delete_all_offences(&self) -> Result<u64> {
		let _writer = self.write_gate.lock().await;
		let result = offence::Entity::delete_many().exec(&self.conn).await?;
		Ok(result.rows_affected)
	}

	async fn commit_attempt(&self, commit: PartitionCommit) -> Result<()> {
		let partition = commit.attempt.partition;
		let _writer = self.write_gate.lock().await;
		let txn = self.conn.begin().await?;

		// Dropping `txn` on any early return rolls everything back
		let current = sdrs_load_result::Entity::find_by_id(partition.to_string())
			.one(&txn)
			.await?
			.map(|row| PartitionLoadStatus::from((partition, row)))
			.ok_or(StoreError::PartitionNotProvisioned(partition))?;

		let written = commit.offences.len();
		for record in commit.offences {
			upsert_offence(&txn, record).await?;
		}

		record_attempt(&txn, current, &commit.attempt).await?;

		txn.commit().await?;

		debug!(%partition, written, status = %commit.attempt.status, "Committed partition attempt;");

		Ok(())
	}

	async fn list_load_statuses(&self) -> Result<Vec<PartitionLoadStatus>> {
		let rows = sdrs_load_result::Entity::find()
			.order_by_asc(sdrs_load_result::Column::AlphaChar)
			.all(&self.conn)
			.await?;

		Ok(rows
			.into_iter()
			.filter_map(|row| {
				parse_partition(&row.alpha_char).map(|partition| (partition, row).into())
			})
			.collect())
	}

	async fn find_offence(&self, code: &str) -> Result<Option<StoredOffence>> {
		Ok(offence::Entity::find()
			.filter(offence::Column::Code.eq(code))
			.one(&self.conn)
			.await?
			.map(Into::into))
	}

	async fn list_offences(&self) -> Result<Vec<StoredOffence>> {
		Ok(offence::Entity::find()
			.order_by_asc(offence::Column::Code)
			.all(&self.conn)
			.await?
			.into_iter()
			.map(Into::into)
			.collect())
	}

	async fn load_history(&self) -> Result<Vec<PartitionLoadHistory>> {
		let rows = sdrs_load_result_history::Entity::find()
			.order_by_asc(sdrs_load_result_history::Column::Id)
			.all(&self.conn)
			.await?;

		Ok(rows
			.into_iter()
			.filter_map(|row| {
				parse_partition(&row.alpha_char).map(|partition| PartitionLoadHistory {
					partition,
					status: row.status,
					load_type: row.load_type,
					load_date: row.load_date,
				})
			})
			.collect())
	}
}
