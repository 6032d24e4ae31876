//! Offence table plus the load status and history tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(Offence::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Offence::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Offence::Code).string().not_null().unique_key())
					.col(ColumnDef::new(Offence::Description).text())
					.col(ColumnDef::new(Offence::CjsTitle).text())
					.col(ColumnDef::new(Offence::RevisionId).integer())
					.col(ColumnDef::new(Offence::StartDate).date())
					.col(ColumnDef::new(Offence::EndDate).date())
					.col(ColumnDef::new(Offence::HomeOfficeStatsCode).string())
					.col(ColumnDef::new(Offence::ChangedDate).timestamp())
					.col(ColumnDef::new(Offence::LoadDate).timestamp())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(SdrsLoadResult::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(SdrsLoadResult::AlphaChar)
							.string()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(SdrsLoadResult::Status).string())
					.col(ColumnDef::new(SdrsLoadResult::LoadType).string())
					.col(ColumnDef::new(SdrsLoadResult::LoadDate).timestamp())
					.col(ColumnDef::new(SdrsLoadResult::LastSuccessfulLoadDate).timestamp())
					.to_owned(),
			)
			.await?;

		manager
			.create_table(
				Table::create()
					.table(SdrsLoadResultHistory::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(SdrsLoadResultHistory::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(SdrsLoadResultHistory::AlphaChar).string().not_null())
					.col(ColumnDef::new(SdrsLoadResultHistory::Status).string().not_null())
					.col(ColumnDef::new(SdrsLoadResultHistory::LoadType).string().not_null())
					.col(
						ColumnDef::new(SdrsLoadResultHistory::LoadDate)
							.timestamp()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_sdrs_load_result_history_alpha_char")
					.table(SdrsLoadResultHistory::Table)
					.col(SdrsLoadResultHistory::AlphaChar)
					.to_owned(),
			)
			.await
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(SdrsLoadResultHistory::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(SdrsLoadResult::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Offence::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum Offence {
	Table,
	Id,
	Code,
	Description,
	CjsTitle,
	RevisionId,
	StartDate,
	EndDate,
	HomeOfficeStatsCode,
	ChangedDate,
	LoadDate,
}

#[derive(DeriveIden)]
pub(super) enum SdrsLoadResult {
	Table,
	AlphaChar,
	Status,
	LoadType,
	LoadDate,
	LastSuccessfulLoadDate,
}

#[derive(DeriveIden)]
enum SdrsLoadResultHistory {
	Table,
	Id,
	AlphaChar,
	Status,
	LoadType,
	LoadDate,
}
