//! Full load flow against the in-memory and SQL stores

mod helpers;

use std::sync::Arc;

use helpers::{at, date, revision, StubRegistry};
use mo_core::{
	domain::{LoadStatus, LoadType, Offence, Partition, PartitionLoadStatus},
	infra::db::{Database, SqlStore},
	store::{MemoryStore, SyncStore},
	sync::{PartitionOutcome, SyncOrchestrator},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn orchestrator(registry: &Arc<StubRegistry>, store: Arc<dyn SyncStore>) -> SyncOrchestrator {
	SyncOrchestrator::new(registry.clone(), store)
}

/// Offences without their surrogate ids, plus every status row
async fn snapshot(store: &dyn SyncStore) -> (Vec<Offence>, Vec<PartitionLoadStatus>) {
	let offences = store
		.list_offences()
		.await
		.unwrap()
		.into_iter()
		.map(|stored| stored.offence)
		.collect();
	(offences, store.list_load_statuses().await.unwrap())
}

#[tokio::test]
async fn loads_every_partition_and_records_outcomes() {
	let registry = StubRegistry::new();
	registry.set_offences(
		Partition::A,
		vec![
			revision("AB10001", 1, date(2013, 1, 1)),
			revision("AB10001", 2, date(2014, 1, 1)),
			revision("AB10002", 3, date(2010, 6, 1)),
		],
	);
	registry.set_error(Partition::B, "SDRS-99999");
	let store = Arc::new(MemoryStore::provisioned());
	let load_date = at(2022, 4, 1);

	let report = orchestrator(&registry, store.clone())
		.run_full_load_at(load_date)
		.await
		.unwrap();

	assert_eq!(report.load_type, LoadType::FullLoad);
	assert_eq!(report.outcomes.len(), 26);
	assert_eq!(
		report.outcome(Partition::A),
		Some(&PartitionOutcome::Loaded { records: 2 })
	);
	assert!(matches!(
		report.outcome(Partition::B),
		Some(PartitionOutcome::Failed { .. })
	));
	assert_eq!(report.outcome(Partition::Q), Some(&PartitionOutcome::NoCache));

	let mut fetched = registry.fetched_partitions();
	fetched.sort();
	assert_eq!(fetched, Partition::all().collect::<Vec<_>>());
	assert!(registry
		.offence_queries()
		.iter()
		.all(|query| query.changed_since.is_none()));

	let stored = store.find_offence("AB10001").await.unwrap().unwrap();
	assert_eq!(stored.offence.revision_id, Some(2));
	assert_eq!(stored.offence.load_date, Some(load_date));
	assert_eq!(store.list_offences().await.unwrap().len(), 2);

	let statuses = store.list_load_statuses().await.unwrap();
	let a = &statuses[0];
	assert_eq!(a.status, Some(LoadStatus::Success));
	assert_eq!(a.load_type, Some(LoadType::FullLoad));
	assert_eq!(a.last_successful_load_date, Some(load_date));

	let b = &statuses[1];
	assert_eq!(b.status, Some(LoadStatus::Fail));
	assert_eq!(b.load_date, Some(load_date));
	assert_eq!(b.last_successful_load_date, None);

	let q = statuses
		.iter()
		.find(|status| status.partition == Partition::Q)
		.unwrap();
	assert_eq!(q.status, Some(LoadStatus::Success));
	assert_eq!(q.last_successful_load_date, Some(load_date));

	assert_eq!(store.load_history().await.unwrap().len(), 26);
}

#[tokio::test]
async fn wipes_offences_the_registry_no_longer_has() {
	let registry = StubRegistry::new();
	registry.set_offences(Partition::A, vec![revision("AB10001", 1, date(2013, 1, 1))]);
	let store = Arc::new(MemoryStore::provisioned());
	store
		.put_offence(revision("ZZ00001", 1, date(2001, 1, 1)).into_offence(at(2020, 1, 1)))
		.await;

	orchestrator(&registry, store.clone())
		.run_full_load_at(at(2022, 4, 1))
		.await
		.unwrap();

	assert_eq!(store.find_offence("ZZ00001").await.unwrap(), None);
	assert!(store.find_offence("AB10001").await.unwrap().is_some());
}

#[tokio::test]
async fn unreachable_registry_fails_only_that_partition() {
	let registry = StubRegistry::new();
	registry.set_unreachable(Partition::C);
	registry.set_offences(Partition::D, vec![revision("DD10001", 1, date(2015, 1, 1))]);
	let store = Arc::new(MemoryStore::provisioned());

	let report = orchestrator(&registry, store.clone())
		.with_max_concurrent_partitions(4)
		.run_full_load_at(at(2022, 4, 1))
		.await
		.unwrap();

	assert_eq!(report.failures().map(|(p, _)| p).collect::<Vec<_>>(), vec![Partition::C]);
	assert_eq!(
		report.outcome(Partition::D),
		Some(&PartitionOutcome::Loaded { records: 1 })
	);

	let statuses = store.list_load_statuses().await.unwrap();
	assert_eq!(statuses[2].status, Some(LoadStatus::Fail));
	assert_eq!(statuses[3].status, Some(LoadStatus::Success));
}

#[tokio::test]
async fn missing_status_row_leaves_partition_unrecorded() {
	let registry = StubRegistry::new();
	registry.set_offences(Partition::C, vec![revision("CC10001", 1, date(2015, 1, 1))]);
	registry.set_offences(Partition::D, vec![revision("DD10001", 1, date(2015, 1, 1))]);
	let store = Arc::new(MemoryStore::with_partitions(
		Partition::all().filter(|partition| *partition != Partition::C),
	));

	let report = orchestrator(&registry, store.clone())
		.run_full_load_at(at(2022, 4, 1))
		.await
		.unwrap();

	assert!(matches!(
		report.outcome(Partition::C),
		Some(PartitionOutcome::Unrecorded { .. })
	));
	assert_eq!(store.find_offence("CC10001").await.unwrap(), None);
	assert!(store.find_offence("DD10001").await.unwrap().is_some());
	assert_eq!(store.load_history().await.unwrap().len(), 25);
}

#[tokio::test]
async fn repeated_full_load_gives_identical_state() {
	let db = Database::in_memory().await.unwrap();
	db.migrate().await.unwrap();
	let store = Arc::new(SqlStore::new(db.conn().clone()));

	let registry = StubRegistry::new();
	registry.set_offences(
		Partition::A,
		vec![
			revision("AB10001", 1, date(2013, 1, 1)),
			revision("AB10001", 2, date(2014, 1, 1)),
		],
	);
	registry.set_offences(Partition::M, vec![revision("MM10001", 5, date(2019, 3, 1))]);
	let orchestrator = orchestrator(&registry, store.clone());
	let load_date = at(2022, 4, 1);

	orchestrator.run_full_load_at(load_date).await.unwrap();
	let first = snapshot(store.as_ref()).await;
	orchestrator.run_full_load_at(load_date).await.unwrap();
	let second = snapshot(store.as_ref()).await;

	assert_eq!(first, second);
	assert_eq!(first.0.len(), 2);
	assert_eq!(store.load_history().await.unwrap().len(), 52);
}

#[tokio::test]
async fn concurrent_partitions_commit_to_file_database() {
	let dir = TempDir::new().unwrap();
	let url = format!(
		"sqlite://{}?mode=rwc",
		dir.path().join("offences.db").display()
	);
	let db = Database::connect(&url).await.unwrap();
	db.migrate().await.unwrap();
	let store = Arc::new(SqlStore::new(db.conn().clone()));

	let registry = StubRegistry::new();
	for partition in Partition::all() {
		registry.set_offences(
			partition,
			(1..=100)
				.map(|n| revision(&format!("{partition}{n:06}"), 1, date(2015, 1, 1)))
				.collect(),
		);
	}
	let orchestrator = orchestrator(&registry, store.clone()).with_max_concurrent_partitions(26);

	for day in 1..=2 {
		let load_date = at(2022, 4, day);
		let report = orchestrator.run_full_load_at(load_date).await.unwrap();

		assert!(report.is_clean(), "{report:?}");
		assert_eq!(report.records_written(), 2600);

		let statuses = store.list_load_statuses().await.unwrap();
		assert!(statuses.iter().all(|status| status.status == Some(LoadStatus::Success)
			&& status.last_successful_load_date == Some(load_date)));
	}

	assert_eq!(store.list_offences().await.unwrap().len(), 2600);
	assert_eq!(store.load_history().await.unwrap().len(), 52);
}
