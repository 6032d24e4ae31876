//! Registry status classification

use crate::infra::registry::MessageStatus;

/// Error code the registry returns when a partition's cache holds nothing.
///
/// It is also what an empty partition looks like, so it counts as success.
pub const NO_CACHE_ERROR_CODE: &str = "SDRS-99918";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
	/// Use the payload
	Proceed,
	/// Nothing to load; record success without writes
	NoCache,
	/// Record a failure; the checkpoint stays where it is
	Failed { code: Option<String>, reason: Option<String> },
}

/// Decide what an envelope status means for the partition being loaded.
///
/// Only an explicit ERRORED status is a failure; anything else proceeds.
pub fn classify(status: &MessageStatus) -> Classification {
	if !status.is_errored() {
		return Classification::Proceed;
	}

	match status.code() {
		Some(NO_CACHE_ERROR_CODE) => Classification::NoCache,
		code => Classification::Failed {
			code: code.map(str::to_string),
			reason: status.reason.clone(),
		},
	}
}
