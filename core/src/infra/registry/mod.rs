//! Registry client - the SDRS boundary
//!
//! The sync engine only sees [`RegistryClient`]: two request types, each
//! answered by a status envelope plus an optional payload. Whether an errored
//! envelope is a real failure is decided by the engine, not the client.

pub mod client;
pub mod wire;

pub use client::SdrsApiClient;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OffenceRevision, Partition};

/// Errors raised before a usable envelope was received
#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Unexpected HTTP status {status}: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},

	#[error("Failed to decode registry response: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("Registry response is missing its {0} payload")]
	MissingPayload(&'static str),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// `status` field of the registry's message envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
	Success,
	Errored,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStatus {
	pub status: ResponseStatus,
	#[serde(default)]
	pub code: Option<String>,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub detail: Option<String>,
}

impl MessageStatus {
	pub fn success() -> Self {
		Self {
			status: ResponseStatus::Success,
			code: None,
			reason: None,
			detail: None,
		}
	}

	pub fn errored(code: impl Into<String>) -> Self {
		Self {
			status: ResponseStatus::Errored,
			code: Some(code.into()),
			reason: None,
			detail: None,
		}
	}

	pub fn is_errored(&self) -> bool {
		self.status == ResponseStatus::Errored
	}

	/// Error code with the registry's blank padding removed
	pub fn code(&self) -> Option<&str> {
		self.code
			.as_deref()
			.map(str::trim)
			.filter(|code| !code.is_empty())
	}
}

/// A registry answer: the status envelope and, on success, its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryResponse<T> {
	pub status: MessageStatus,
	pub payload: T,
}

/// One control table row: a dataset and when it last changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetUpdate {
	pub data_set: String,
	pub last_update: Option<NaiveDateTime>,
}

/// Filters for a GetOffence call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffenceQuery {
	pub partition: Option<Partition>,
	pub code: Option<String>,
	/// Only revisions changed since this instant; `None` asks for everything
	pub changed_since: Option<NaiveDateTime>,
}

impl OffenceQuery {
	pub fn all_in(partition: Partition) -> Self {
		Self {
			partition: Some(partition),
			..Default::default()
		}
	}

	pub fn changed_in(partition: Partition, since: NaiveDateTime) -> Self {
		Self {
			partition: Some(partition),
			changed_since: Some(since),
			..Default::default()
		}
	}
}

#[async_trait]
pub trait RegistryClient: Send + Sync {
	/// GetOffence. An errored envelope is returned as `Ok` with an empty payload.
	async fn get_offences(
		&self,
		query: OffenceQuery,
	) -> Result<RegistryResponse<Vec<OffenceRevision>>>;

	/// GetControlTable: which datasets changed since `changed_since`
	async fn get_control_table(
		&self,
		changed_since: NaiveDateTime,
	) -> Result<RegistryResponse<Vec<DataSetUpdate>>>;
}
