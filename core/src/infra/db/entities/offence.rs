//! Offence entity - the current view of each offence code

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Offence, StoredOffence};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offence")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i64,
	#[sea_orm(unique)]
	pub code: String,
	pub description: Option<String>,
	pub cjs_title: Option<String>,
	pub revision_id: Option<i32>,
	pub start_date: Option<Date>,
	pub end_date: Option<Date>,
	pub home_office_stats_code: Option<String>,
	pub changed_date: Option<DateTime>,
	pub load_date: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StoredOffence {
	fn from(model: Model) -> Self {
		Self {
			id: model.id,
			offence: Offence {
				code: model.code,
				description: model.description,
				cjs_title: model.cjs_title,
				revision_id: model.revision_id,
				start_date: model.start_date,
				end_date: model.end_date,
				home_office_stats_code: model.home_office_stats_code,
				changed_date: model.changed_date,
				load_date: model.load_date,
			},
		}
	}
}
