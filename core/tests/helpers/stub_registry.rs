//! Scripted in-process registry

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mo_core::{
	domain::{OffenceRevision, Partition},
	infra::registry::{
		DataSetUpdate, MessageStatus, OffenceQuery, RegistryClient, RegistryError,
		RegistryResponse, Result,
	},
	sync::NO_CACHE_ERROR_CODE,
};

#[derive(Debug, Clone)]
pub enum Reply<T> {
	Envelope(MessageStatus, T),
	/// The request never produced an envelope
	Unreachable,
}

impl<T: Clone> Reply<T> {
	fn resolve(&self) -> Result<RegistryResponse<T>> {
		match self {
			Self::Envelope(status, payload) => Ok(RegistryResponse {
				status: status.clone(),
				payload: payload.clone(),
			}),
			Self::Unreachable => Err(RegistryError::Status {
				status: reqwest::StatusCode::BAD_GATEWAY,
				body: "upstream unavailable".to_string(),
			}),
		}
	}
}

/// Answers from fixed scripts and records every request.
///
/// Partitions without a script answer the way the registry does for an empty
/// partition: ERRORED with the no-cache code.
#[derive(Debug, Default)]
pub struct StubRegistry {
	offences: Mutex<HashMap<Partition, Reply<Vec<OffenceRevision>>>>,
	control_table: Mutex<Option<Reply<Vec<DataSetUpdate>>>>,
	offence_queries: Mutex<Vec<OffenceQuery>>,
	control_table_requests: Mutex<Vec<NaiveDateTime>>,
}

impl StubRegistry {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn set_offences(&self, partition: Partition, revisions: Vec<OffenceRevision>) {
		self.offences.lock().unwrap().insert(
			partition,
			Reply::Envelope(MessageStatus::success(), revisions),
		);
	}

	pub fn set_error(&self, partition: Partition, code: &str) {
		self.offences.lock().unwrap().insert(
			partition,
			Reply::Envelope(MessageStatus::errored(code), Vec::new()),
		);
	}

	pub fn set_unreachable(&self, partition: Partition) {
		self.offences
			.lock()
			.unwrap()
			.insert(partition, Reply::Unreachable);
	}

	pub fn set_control_table(&self, data_sets: &[&str]) {
		let updates = data_sets
			.iter()
			.map(|name| DataSetUpdate {
				data_set: name.to_string(),
				last_update: None,
			})
			.collect();
		*self.control_table.lock().unwrap() =
			Some(Reply::Envelope(MessageStatus::success(), updates));
	}

	pub fn set_control_table_error(&self, code: &str) {
		*self.control_table.lock().unwrap() =
			Some(Reply::Envelope(MessageStatus::errored(code), Vec::new()));
	}

	pub fn offence_queries(&self) -> Vec<OffenceQuery> {
		self.offence_queries.lock().unwrap().clone()
	}

	/// Partitions fetched so far, in request order
	pub fn fetched_partitions(&self) -> Vec<Partition> {
		self.offence_queries()
			.into_iter()
			.filter_map(|query| query.partition)
			.collect()
	}

	pub fn control_table_requests(&self) -> Vec<NaiveDateTime> {
		self.control_table_requests.lock().unwrap().clone()
	}

	pub fn clear_requests(&self) {
		self.offence_queries.lock().unwrap().clear();
		self.control_table_requests.lock().unwrap().clear();
	}
}

#[async_trait]
impl RegistryClient for StubRegistry {
	async fn get_offences(
		&self,
		query: OffenceQuery,
	) -> Result<RegistryResponse<Vec<OffenceRevision>>> {
		self.offence_queries.lock().unwrap().push(query.clone());

		let offences = self.offences.lock().unwrap();
		match query.partition.and_then(|partition| offences.get(&partition)) {
			Some(reply) => reply.resolve(),
			None => Ok(RegistryResponse {
				status: MessageStatus::errored(NO_CACHE_ERROR_CODE),
				payload: Vec::new(),
			}),
		}
	}

	async fn get_control_table(
		&self,
		changed_since: NaiveDateTime,
	) -> Result<RegistryResponse<Vec<DataSetUpdate>>> {
		self.control_table_requests
			.lock()
			.unwrap()
			.push(changed_since);

		match self.control_table.lock().unwrap().as_ref() {
			Some(reply) => reply.resolve(),
			None => Ok(RegistryResponse {
				status: MessageStatus::success(),
				payload: Vec::new(),
			}),
		}
	}
}
