//! Per-partition load status, one row per partition

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{LoadStatus, LoadType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sdrs_load_result")]
pub struct Model {
	/// Partition key, a single letter
	#[sea_orm(primary_key, auto_increment = false)]
	pub alpha_char: String,
	pub status: Option<LoadStatus>,
	pub load_type: Option<LoadType>,
	pub load_date: Option<DateTime>,
	pub last_successful_load_date: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
