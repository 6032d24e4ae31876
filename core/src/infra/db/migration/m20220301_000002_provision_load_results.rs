//! Provision one load status row per partition
//!
//! The sync engine only ever updates these rows; a missing row is treated as a
//! configuration error, so they have to exist before the first run.

use sea_orm_migration::prelude::*;

use super::m20220301_000001_create_offence_tables::SdrsLoadResult;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		let mut insert = Query::insert()
			.into_table(SdrsLoadResult::Table)
			.columns([SdrsLoadResult::AlphaChar])
			.to_owned();

		for alpha_char in 'A'..='Z' {
			insert.values_panic([alpha_char.to_string().into()]);
		}

		manager.exec_stmt(insert).await
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.exec_stmt(Query::delete().from_table(SdrsLoadResult::Table).to_owned())
			.await
	}
}
