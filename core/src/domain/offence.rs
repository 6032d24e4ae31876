//! Offence records

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The current, registry-sourced view of one offence code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offence {
	/// Business key, stable across revisions
	pub code: String,
	pub description: Option<String>,
	/// CJS title, usually the same as the description
	pub cjs_title: Option<String>,
	pub revision_id: Option<i32>,
	pub start_date: Option<NaiveDate>,
	pub end_date: Option<NaiveDate>,
	pub home_office_stats_code: Option<String>,
	/// Last modified in the registry
	pub changed_date: Option<NaiveDateTime>,
	/// When this copy was ingested locally
	pub load_date: Option<NaiveDateTime>,
}

/// An offence as held by a store, with its local surrogate key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOffence {
	pub id: i64,
	#[serde(flatten)]
	pub offence: Offence,
}

/// One revision of an offence as returned by the registry.
///
/// A single fetch may carry several revisions of the same code; the
/// reconciler reduces them to the one that becomes the stored [`Offence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffenceRevision {
	pub code: String,
	pub revision_id: Option<i32>,
	pub start_date: Option<NaiveDate>,
	pub end_date: Option<NaiveDate>,
	pub description: Option<String>,
	pub cjs_title: Option<String>,
	pub home_office_stats_code: Option<String>,
	pub changed_date: Option<NaiveDateTime>,
}

impl OffenceRevision {
	pub fn into_offence(self, load_date: NaiveDateTime) -> Offence {
		Offence {
			code: self.code,
			description: self.description,
			cjs_title: self.cjs_title,
			revision_id: self.revision_id,
			start_date: self.start_date,
			end_date: self.end_date,
			home_office_stats_code: self.home_office_stats_code,
			changed_date: self.changed_date,
			load_date: Some(load_date),
		}
	}
}
