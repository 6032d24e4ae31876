//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod stub_registry;

pub use stub_registry::*;

use chrono::{NaiveDate, NaiveDateTime};
use mo_core::domain::OffenceRevision;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
	date(y, m, d).and_hms_opt(10, 30, 0).unwrap()
}

/// A registry revision with a start date and every text field filled in
pub fn revision(code: &str, revision_id: i32, start: NaiveDate) -> OffenceRevision {
	OffenceRevision {
		code: code.to_string(),
		revision_id: Some(revision_id),
		start_date: Some(start),
		end_date: None,
		description: Some(format!("{code} description {revision_id}")),
		cjs_title: Some(format!("{code} title {revision_id}")),
		home_office_stats_code: Some("195/99".to_string()),
		changed_date: Some(start.and_hms_opt(0, 0, 0).unwrap()),
	}
}
