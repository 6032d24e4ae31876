//! HTTP client for the SDRS API

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use super::{
	wire::{SdrsRequest, SdrsResponse},
	DataSetUpdate, OffenceQuery, RegistryClient, RegistryError, RegistryResponse, Result,
};
use crate::{config::RegistryConfig, domain::OffenceRevision};

/// Talks to SDRS over HTTP. Retries and TLS are left to `reqwest`.
#[derive(Debug, Clone)]
pub struct SdrsApiClient {
	client: reqwest::Client,
	endpoint: String,
}

impl SdrsApiClient {
	pub fn new(config: &RegistryConfig) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(config.request_timeout)
			.build()?;

		Ok(Self::with_client(client, config.endpoint_url()))
	}

	pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
		Self {
			client,
			endpoint: endpoint.into(),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	#[instrument(skip_all, fields(message_type = request.message_type()), err)]
	async fn call(&self, request: SdrsRequest) -> Result<SdrsResponse> {
		let response = self.client.post(&self.endpoint).json(&request).send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(RegistryError::Status { status, body });
		}

		let bytes = response.bytes().await?;
		let decoded: SdrsResponse = serde_json::from_slice(&bytes)?;

		debug!(
			status = ?decoded.message_status.status,
			code = ?decoded.message_status.code(),
			"Received SDRS response;"
		);

		Ok(decoded)
	}
}

#[async_trait]
impl RegistryClient for SdrsApiClient {
	async fn get_offences(
		&self,
		query: OffenceQuery,
	) -> Result<RegistryResponse<Vec<OffenceRevision>>> {
		self.call(SdrsRequest::get_offence(&query))
			.await?
			.into_offences()
	}

	async fn get_control_table(
		&self,
		changed_since: NaiveDateTime,
	) -> Result<RegistryResponse<Vec<DataSetUpdate>>> {
		self.call(SdrsRequest::get_control_table(changed_since))
			.await?
			.into_control_table()
	}
}
