//! Per-partition load bookkeeping

use chrono::NaiveDateTime;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::Partition;

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	EnumIter,
	DeriveActiveEnum,
	Serialize,
	Deserialize,
	Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
	#[sea_orm(string_value = "SUCCESS")]
	Success,
	#[sea_orm(string_value = "FAIL")]
	Fail,
}

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	EnumIter,
	DeriveActiveEnum,
	Serialize,
	Deserialize,
	Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
	#[sea_orm(string_value = "FULL_LOAD")]
	FullLoad,
	#[sea_orm(string_value = "UPDATE")]
	Update,
}

/// Load state of one partition.
///
/// One row exists per partition from the moment the schema is provisioned;
/// `status` and the dates stay unset until the first attempt is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionLoadStatus {
	pub partition: Partition,
	pub status: Option<LoadStatus>,
	pub load_type: Option<LoadType>,
	/// Most recent attempt, successful or not
	pub load_date: Option<NaiveDateTime>,
	/// Checkpoint for "what changed since I last succeeded"
	pub last_successful_load_date: Option<NaiveDateTime>,
}

impl PartitionLoadStatus {
	pub fn provisioned(partition: Partition) -> Self {
		Self {
			partition,
			status: None,
			load_type: None,
			load_date: None,
			last_successful_load_date: None,
		}
	}
}

/// The outcome of one sync attempt against one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadAttempt {
	pub partition: Partition,
	pub status: LoadStatus,
	pub load_type: LoadType,
	pub load_date: NaiveDateTime,
}

/// Append-only audit entry, one per recorded attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionLoadHistory {
	pub partition: Partition,
	pub status: LoadStatus,
	pub load_type: LoadType,
	pub load_date: NaiveDateTime,
}

impl From<&LoadAttempt> for PartitionLoadHistory {
	fn from(attempt: &LoadAttempt) -> Self {
		Self {
			partition: attempt.partition,
			status: attempt.status,
			load_type: attempt.load_type,
			load_date: attempt.load_date,
		}
	}
}
