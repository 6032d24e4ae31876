//! Service configuration management

use std::path::PathBuf;

use thiserror::Error;

pub mod sync_config;

pub use sync_config::{RegistryConfig, ScheduleConfig, SyncConfig};

/// Environment variable overriding `database_url`
pub const DATABASE_URL_ENV: &str = "MO_DATABASE_URL";
/// Environment variable overriding `registry.base_url`
pub const REGISTRY_URL_ENV: &str = "MO_REGISTRY_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to read config {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Invalid configuration: {0}")]
	Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
