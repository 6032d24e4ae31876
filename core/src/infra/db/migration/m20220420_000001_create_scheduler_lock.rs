//! Lease table for the database job lock

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(SchedulerLock::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(SchedulerLock::Name)
							.string()
							.not_null()
							.primary_key(),
					)
					// RFC 3339 UTC text, compared lexicographically
					.col(ColumnDef::new(SchedulerLock::LockUntil).text().not_null())
					.col(ColumnDef::new(SchedulerLock::LockedAt).text().not_null())
					.col(ColumnDef::new(SchedulerLock::LockedBy).text().not_null())
					.to_owned(),
			)
			.await
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(SchedulerLock::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum SchedulerLock {
	Table,
	Name,
	LockUntil,
	LockedAt,
	LockedBy,
}
