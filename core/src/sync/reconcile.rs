//! Revision reconciliation

use std::collections::HashMap;

use crate::domain::OffenceRevision;

/// Reduce a fetch to one revision per code: the one with the latest start date.
///
/// Codes keep the order in which they first appear. On equal start dates the
/// earlier revision wins, and a missing start date loses to any present one.
pub fn latest_of_each(revisions: Vec<OffenceRevision>) -> Vec<OffenceRevision> {
	let mut winners: Vec<OffenceRevision> = Vec::with_capacity(revisions.len());
	let mut index: HashMap<String, usize> = HashMap::with_capacity(revisions.len());

	for revision in revisions {
		match index.get(&revision.code) {
			Some(&slot) => {
				// Option orders None below Some, so undated revisions never displace dated ones
				if revision.start_date > winners[slot].start_date {
					winners[slot] = revision;
				}
			}
			None => {
				index.insert(revision.code.clone(), winners.len());
				winners.push(revision);
			}
		}
	}

	winners
}
