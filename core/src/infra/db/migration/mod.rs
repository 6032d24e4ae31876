//! Database migrations

use sea_orm_migration::prelude::*;

mod m20220301_000001_create_offence_tables;
mod m20220301_000002_provision_load_results;
mod m20220420_000001_create_scheduler_lock;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
	fn migrations() -> Vec<Box<dyn MigrationTrait>> {
		vec![
			Box::new(m20220301_000001_create_offence_tables::Migration),
			Box::new(m20220301_000002_provision_load_results::Migration),
			Box::new(m20220420_000001_create_scheduler_lock::Migration),
		]
	}
}
