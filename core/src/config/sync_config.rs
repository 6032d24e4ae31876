//! Sync service configuration

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ConfigError, Result, DATABASE_URL_ENV, REGISTRY_URL_ENV};
use crate::infra::lock::LockPolicy;

/// Main service configuration, read from TOML.
///
/// Every field has a default so a partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	/// SeaORM connection string
	pub database_url: String,

	/// Default `tracing` filter when `RUST_LOG` is unset
	pub log_level: String,

	/// Also write plain-text logs here
	pub log_file: Option<std::path::PathBuf>,

	/// Partitions processed at once within one run
	pub max_concurrent_partitions: usize,

	pub registry: RegistryConfig,

	pub schedule: ScheduleConfig,

	pub lock: LockPolicy,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			database_url: "sqlite://manage-offences.db?mode=rwc".to_string(),
			log_level: "info".to_string(),
			log_file: None,
			max_concurrent_partitions: 1,
			registry: RegistryConfig::default(),
			schedule: ScheduleConfig::default(),
			lock: LockPolicy::default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
	pub base_url: String,
	pub endpoint: String,
	#[serde(with = "humantime_serde")]
	pub request_timeout: Duration,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:8332".to_string(),
			endpoint: "/cld_StandingDataReferenceService/service/sdrs/sdrs/sdrsApi".to_string(),
			request_timeout: Duration::from_secs(30),
		}
	}
}

impl RegistryConfig {
	pub fn endpoint_url(&self) -> String {
		format!(
			"{}/{}",
			self.base_url.trim_end_matches('/'),
			self.endpoint.trim_start_matches('/')
		)
	}
}

/// Which periodic jobs run and how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
	pub full_load_enabled: bool,
	#[serde(with = "humantime_serde")]
	pub full_load_interval: Duration,
	pub update_enabled: bool,
	#[serde(with = "humantime_serde")]
	pub update_interval: Duration,
}

impl Default for ScheduleConfig {
	fn default() -> Self {
		Self {
			full_load_enabled: false,
			full_load_interval: Duration::from_secs(24 * 60 * 60),
			update_enabled: true,
			update_interval: Duration::from_secs(15 * 60),
		}
	}
}

impl SyncConfig {
	/// Load configuration from a TOML file, then apply environment overrides
	pub fn load_from(path: &Path) -> Result<Self> {
		info!("Loading config from {:?}", path);

		let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;

		let mut config: SyncConfig = toml::from_str(&raw)?;
		config.apply_overrides(|key| std::env::var(key).ok());
		config.validate()?;

		Ok(config)
	}

	/// Load from `path` when given, otherwise run on defaults
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load_from(path),
			None => {
				warn!("No config file given, using defaults");
				let mut config = Self::default();
				config.apply_overrides(|key| std::env::var(key).ok());
				config.validate()?;
				Ok(config)
			}
		}
	}

	pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		if let Some(url) = lookup(DATABASE_URL_ENV) {
			self.database_url = url;
		}

		if let Some(url) = lookup(REGISTRY_URL_ENV) {
			self.registry.base_url = url;
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.database_url.trim().is_empty() {
			return Err(ConfigError::Invalid("database_url is empty".to_string()));
		}

		if !self.database_url.starts_with("sqlite:") {
			return Err(ConfigError::Invalid(format!(
				"database_url must be a sqlite URL, got {:?}",
				self.database_url
			)));
		}

		if self.registry.base_url.trim().is_empty() {
			return Err(ConfigError::Invalid("registry.base_url is empty".to_string()));
		}

		if self.max_concurrent_partitions == 0 {
			return Err(ConfigError::Invalid(
				"max_concurrent_partitions must be at least 1".to_string(),
			));
		}

		if self.schedule.full_load_enabled && self.schedule.full_load_interval.is_zero() {
			return Err(ConfigError::Invalid(
				"schedule.full_load_interval must be non-zero".to_string(),
			));
		}

		if self.schedule.update_enabled && self.schedule.update_interval.is_zero() {
			return Err(ConfigError::Invalid(
				"schedule.update_interval must be non-zero".to_string(),
			));
		}

		if self.lock.at_least_for > self.lock.at_most_for {
			return Err(ConfigError::Invalid(
				"lock.at_least_for cannot exceed lock.at_most_for".to_string(),
			));
		}

		Ok(())
	}
}
