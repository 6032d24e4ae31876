//! Append-only log of every recorded load attempt

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{LoadStatus, LoadType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sdrs_load_result_history")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	#[sea_orm(indexed)]
	pub alpha_char: String,
	pub status: LoadStatus,
	pub load_type: LoadType,
	pub load_date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
