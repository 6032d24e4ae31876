//! SeaORM store and database job lock

mod helpers;

use std::time::Duration;

use helpers::{at, date, revision};
use mo_core::{
	domain::{LoadAttempt, LoadStatus, LoadType, Partition, PartitionLoadHistory},
	infra::{
		db::{entities::sdrs_load_result, Database, SqlStore},
		lock::{DbJobLock, JobLock, LockPolicy},
	},
	store::{PartitionCommit, StoreError, SyncStore},
};
use pretty_assertions::assert_eq;
use sea_orm::EntityTrait;
use tempfile::TempDir;

async fn migrated() -> Database {
	let db = Database::in_memory().await.unwrap();
	db.migrate().await.unwrap();
	db
}

fn attempt(partition: Partition, status: LoadStatus, day: u32) -> LoadAttempt {
	LoadAttempt {
		partition,
		status,
		load_type: LoadType::Update,
		load_date: at(2022, 4, day),
	}
}

#[tokio::test]
async fn migration_provisions_every_partition() {
	let db = migrated().await;
	let store = SqlStore::new(db.conn().clone());

	let statuses = store.list_load_statuses().await.unwrap();

	assert_eq!(
		statuses.iter().map(|s| s.partition).collect::<Vec<_>>(),
		Partition::all().collect::<Vec<_>>()
	);
	assert!(statuses
		.iter()
		.all(|s| s.status.is_none() && s.last_successful_load_date.is_none()));
}

#[tokio::test]
async fn commit_upserts_by_code_and_appends_history() {
	let db = migrated().await;
	let store = SqlStore::new(db.conn().clone());

	store
		.commit_attempt(PartitionCommit {
			attempt: attempt(Partition::X, LoadStatus::Success, 1),
			offences: vec![revision("XX99001", 1, date(2013, 1, 1)).into_offence(at(2022, 4, 1))],
		})
		.await
		.unwrap();
	let before = store.find_offence("XX99001").await.unwrap().unwrap();

	store
		.commit_attempt(PartitionCommit {
			attempt: attempt(Partition::X, LoadStatus::Success, 2),
			offences: vec![revision("XX99001", 2, date(2014, 1, 1)).into_offence(at(2022, 4, 2))],
		})
		.await
		.unwrap();
	let after = store.find_offence("XX99001").await.unwrap().unwrap();

	assert_eq!(after.id, before.id);
	assert_eq!(after.offence.revision_id, Some(2));
	assert_eq!(after.offence.start_date, Some(date(2014, 1, 1)));
	assert_eq!(after.offence.description.as_deref(), Some("XX99001 description 2"));
	assert_eq!(store.list_offences().await.unwrap().len(), 1);

	store
		.commit_attempt(PartitionCommit::status_only(attempt(
			Partition::X,
			LoadStatus::Fail,
			3,
		)))
		.await
		.unwrap();

	let x = store
		.list_load_statuses()
		.await
		.unwrap()
		.into_iter()
		.find(|s| s.partition == Partition::X)
		.unwrap();
	assert_eq!(x.status, Some(LoadStatus::Fail));
	assert_eq!(x.load_date, Some(at(2022, 4, 3)));
	assert_eq!(x.last_successful_load_date, Some(at(2022, 4, 2)));

	assert_eq!(
		store.load_history().await.unwrap(),
		vec![
			PartitionLoadHistory::from(&attempt(Partition::X, LoadStatus::Success, 1)),
			PartitionLoadHistory::from(&attempt(Partition::X, LoadStatus::Success, 2)),
			PartitionLoadHistory::from(&attempt(Partition::X, LoadStatus::Fail, 3)),
		]
	);
}

#[tokio::test]
async fn missing_status_row_rolls_back_offence_writes() {
	let db = migrated().await;
	let store = SqlStore::new(db.conn().clone());
	sdrs_load_result::Entity::delete_by_id("C".to_string())
		.exec(db.conn())
		.await
		.unwrap();

	let err = store
		.commit_attempt(PartitionCommit {
			attempt: attempt(Partition::C, LoadStatus::Success, 1),
			offences: vec![revision("CC10001", 1, date(2015, 1, 1)).into_offence(at(2022, 4, 1))],
		})
		.await
		.unwrap_err();

	assert!(matches!(err, StoreError::PartitionNotProvisioned(Partition::C)));
	assert_eq!(store.find_offence("CC10001").await.unwrap(), None);
	assert!(store.load_history().await.unwrap().is_empty());
	assert_eq!(store.list_load_statuses().await.unwrap().len(), 25);
}

#[tokio::test]
async fn delete_all_offences_reports_count() {
	let db = migrated().await;
	let store = SqlStore::new(db.conn().clone());
	store
		.commit_attempt(PartitionCommit {
			attempt: attempt(Partition::A, LoadStatus::Success, 1),
			offences: vec![
				revision("AB10001", 1, date(2015, 1, 1)).into_offence(at(2022, 4, 1)),
				revision("AB10002", 1, date(2015, 1, 1)).into_offence(at(2022, 4, 1)),
			],
		})
		.await
		.unwrap();

	assert_eq!(store.delete_all_offences().await.unwrap(), 2);
	assert!(store.list_offences().await.unwrap().is_empty());
	// Status rows are never wiped
	assert_eq!(store.list_load_statuses().await.unwrap().len(), 26);
}

#[tokio::test]
async fn checkpoints_survive_reopening_the_database() {
	let dir = TempDir::new().unwrap();
	let url = format!(
		"sqlite://{}?mode=rwc",
		dir.path().join("offences.db").display()
	);

	{
		let db = Database::connect(&url).await.unwrap();
		db.migrate().await.unwrap();
		SqlStore::new(db.conn().clone())
			.commit_attempt(PartitionCommit::status_only(attempt(
				Partition::K,
				LoadStatus::Success,
				5,
			)))
			.await
			.unwrap();
	}

	let db = Database::connect(&url).await.unwrap();
	db.migrate().await.unwrap();
	let statuses = SqlStore::new(db.conn().clone())
		.list_load_statuses()
		.await
		.unwrap();

	assert_eq!(statuses.len(), 26);
	assert_eq!(statuses[10].partition, Partition::K);
	assert_eq!(statuses[10].last_successful_load_date, Some(at(2022, 4, 5)));
}

#[tokio::test]
async fn db_lock_excludes_other_holders() {
	let db = migrated().await;
	let ours = DbJobLock::with_holder(db.conn().clone(), "instance-1");
	let theirs = DbJobLock::with_holder(db.conn().clone(), "instance-2");
	let policy = LockPolicy {
		at_most_for: Duration::from_secs(600),
		at_least_for: Duration::ZERO,
	};

	let lease = ours
		.try_acquire("offence_update", policy)
		.await
		.unwrap()
		.expect("free lock");
	assert_eq!(lease.holder, "instance-1");

	assert!(theirs
		.try_acquire("offence_update", policy)
		.await
		.unwrap()
		.is_none());
	assert!(theirs
		.try_acquire("offence_full_load", policy)
		.await
		.unwrap()
		.is_some());

	ours.release(lease).await.unwrap();

	let taken_over = theirs
		.try_acquire("offence_update", policy)
		.await
		.unwrap()
		.expect("released lock");
	assert_eq!(taken_over.holder, "instance-2");
}

#[tokio::test]
async fn db_lock_keeps_minimum_hold_after_release() {
	let db = migrated().await;
	let ours = DbJobLock::with_holder(db.conn().clone(), "instance-1");
	let theirs = DbJobLock::with_holder(db.conn().clone(), "instance-2");
	let policy = LockPolicy::default();

	let lease = ours.try_acquire("offence_update", policy).await.unwrap().unwrap();
	ours.release(lease).await.unwrap();

	assert!(theirs
		.try_acquire("offence_update", policy)
		.await
		.unwrap()
		.is_none());
}
