//! SDRS message envelope as it appears on the wire
//!
//! Every call is a POST of a `MessageHeader` + `MessageBody` envelope; the
//! operation is selected by which `GatewayOperationType` member is present.
//! Field names are PascalCase except where the registry deviates (`code`,
//! `MessageStatus` members, `UUID`, `CJSCode`, `MOJStatsCode`).

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{DataSetUpdate, MessageStatus, OffenceQuery, RegistryError, RegistryResponse};
use crate::domain::OffenceRevision;

pub const MESSAGE_FROM: &str = "CONSUMER_APPLICATION";
pub const MESSAGE_TO: &str = "SDRS_AZURE";
pub const ALL_OFFENCES: &str = "ALL";

pub const GET_OFFENCE: &str = "GetOffence";
pub const GET_CONTROL_TABLE: &str = "GetControlTable";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdrsRequest {
	pub message_header: MessageHeader,
	pub message_body: MessageBodyRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageHeader {
	#[serde(rename = "MessageID")]
	pub message_id: MessageId,
	pub time_stamp: DateTime<Utc>,
	pub message_type: String,
	pub from: String,
	pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageId {
	#[serde(rename = "UUID")]
	pub uuid: Uuid,
	pub relates_to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageBodyRequest {
	pub gateway_operation_type: GatewayOperationTypeRequest,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayOperationTypeRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub get_offence_request: Option<GetOffenceRequest>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub get_control_table_request: Option<GetControlTableRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetOffenceRequest {
	pub all_offences: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub alpha_char: Option<char>,
	#[serde(rename = "CJSCode", skip_serializing_if = "Option::is_none")]
	pub cjs_code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub changed_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetControlTableRequest {
	pub changed_date_time: NaiveDateTime,
}

impl SdrsRequest {
	fn new(message_type: &str, operation: GatewayOperationTypeRequest) -> Self {
		Self {
			message_header: MessageHeader {
				message_id: MessageId {
					uuid: Uuid::new_v4(),
					relates_to: String::new(),
				},
				time_stamp: Utc::now(),
				message_type: message_type.to_string(),
				from: MESSAGE_FROM.to_string(),
				to: MESSAGE_TO.to_string(),
			},
			message_body: MessageBodyRequest {
				gateway_operation_type: operation,
			},
		}
	}

	pub fn get_offence(query: &OffenceQuery) -> Self {
		Self::new(
			GET_OFFENCE,
			GatewayOperationTypeRequest {
				get_offence_request: Some(GetOffenceRequest {
					all_offences: ALL_OFFENCES.to_string(),
					alpha_char: query.partition.map(|p| p.as_char()),
					cjs_code: query.code.clone(),
					changed_date: query.changed_since,
				}),
				..Default::default()
			},
		)
	}

	pub fn get_control_table(changed_since: NaiveDateTime) -> Self {
		Self::new(
			GET_CONTROL_TABLE,
			GatewayOperationTypeRequest {
				get_control_table_request: Some(GetControlTableRequest {
					changed_date_time: changed_since,
				}),
				..Default::default()
			},
		)
	}

	pub fn message_type(&self) -> &str {
		&self.message_header.message_type
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdrsResponse {
	#[serde(default)]
	pub message_body: Option<MessageBodyResponse>,
	pub message_status: MessageStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageBodyResponse {
	#[serde(default)]
	pub gateway_operation_type: GatewayOperationTypeResponse,
}

/// Errored responses carry an `Acknowledgement` member instead, which is ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayOperationTypeResponse {
	#[serde(default)]
	pub get_offence_response: Option<GetOffenceResponse>,
	#[serde(default)]
	pub get_control_table_response: Option<GetControlTableResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetOffenceResponse {
	#[serde(rename = "Offence", default)]
	pub offences: Vec<Offence>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Offence {
	pub code: String,
	#[serde(rename = "OffenceRevisionId", default)]
	pub revision_id: Option<i32>,
	#[serde(rename = "OffenceStartDate", default, deserialize_with = "blank_as_none")]
	pub start_date: Option<NaiveDate>,
	#[serde(rename = "OffenceEndDate", default, deserialize_with = "blank_as_none")]
	pub end_date: Option<NaiveDate>,
	#[serde(rename = "Description", default)]
	pub description: Option<String>,
	#[serde(rename = "CJSTitle", default)]
	pub cjs_title: Option<String>,
	#[serde(rename = "MOJStatsCode", default)]
	pub moj_stats_code: Option<String>,
	#[serde(rename = "ChangedDate", default, deserialize_with = "blank_as_none")]
	pub changed_date: Option<NaiveDateTime>,
}

impl From<Offence> for OffenceRevision {
	fn from(offence: Offence) -> Self {
		Self {
			code: offence.code,
			revision_id: offence.revision_id,
			start_date: offence.start_date,
			end_date: offence.end_date,
			description: offence.description,
			cjs_title: offence.cjs_title,
			home_office_stats_code: offence.moj_stats_code,
			changed_date: offence.changed_date,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetControlTableResponse {
	#[serde(rename = "ReferenceDataSet", default)]
	pub reference_data_sets: Vec<ReferenceDataSet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceDataSet {
	#[serde(rename = "DataSet")]
	pub data_set: String,
	#[serde(rename = "LastUpdate", default, deserialize_with = "blank_as_none")]
	pub last_update: Option<NaiveDateTime>,
}

impl SdrsResponse {
	fn operation(self) -> (MessageStatus, GatewayOperationTypeResponse) {
		(
			self.message_status,
			self.message_body
				.map(|body| body.gateway_operation_type)
				.unwrap_or_default(),
		)
	}

	pub fn into_offences(self) -> Result<RegistryResponse<Vec<OffenceRevision>>, RegistryError> {
		let (status, operation) = self.operation();

		if status.is_errored() {
			return Ok(RegistryResponse {
				status,
				payload: Vec::new(),
			});
		}

		let response = operation
			.get_offence_response
			.ok_or(RegistryError::MissingPayload("GetOffenceResponse"))?;

		Ok(RegistryResponse {
			status,
			payload: response.offences.into_iter().map(Into::into).collect(),
		})
	}

	pub fn into_control_table(self) -> Result<RegistryResponse<Vec<DataSetUpdate>>, RegistryError> {
		let (status, operation) = self.operation();

		if status.is_errored() {
			return Ok(RegistryResponse {
				status,
				payload: Vec::new(),
			});
		}

		let response = operation
			.get_control_table_response
			.ok_or(RegistryError::MissingPayload("GetControlTableResponse"))?;

		Ok(RegistryResponse {
			status,
			payload: response
				.reference_data_sets
				.into_iter()
				.map(|set| DataSetUpdate {
					data_set: set.data_set,
					last_update: set.last_update,
				})
				.collect(),
		})
	}
}

/// The registry sends `""` for absent dates
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: FromStr,
	T::Err: Display,
{
	match Option::<String>::deserialize(deserializer)?
		.as_deref()
		.map(str::trim)
	{
		None | Some("") => Ok(None),
		Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
	}
}
