//! Database infrastructure using SeaORM

use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub mod entities;
pub mod migration;
pub mod store;

pub use store::SqlStore;

/// Database wrapper for the sync service
#[derive(Debug, Clone)]
pub struct Database {
	/// SeaORM database connection
	conn: DatabaseConnection,
}

impl Database {
	/// Connect to `url`, e.g. `sqlite://manage-offences.db?mode=rwc`
	pub async fn connect(url: &str) -> Result<Self, DbErr> {
		let mut opt = ConnectOptions::new(url.to_owned());
		opt.max_connections(10)
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.idle_timeout(Duration::from_secs(8))
			.sqlx_logging(false); // We'll use tracing instead

		let conn = SeaDatabase::connect(opt).await?;

		info!("Connected to database");

		Ok(Self { conn })
	}

	/// A private in-memory SQLite database.
	///
	/// Every pooled connection to `sqlite::memory:` opens a fresh database, so
	/// the pool is pinned to a single connection.
	pub async fn in_memory() -> Result<Self, DbErr> {
		let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
		opt.max_connections(1)
			.min_connections(1)
			.sqlx_logging(false);

		let conn = SeaDatabase::connect(opt).await?;

		Ok(Self { conn })
	}

	/// Run migrations
	pub async fn migrate(&self) -> Result<(), DbErr> {
		migration::Migrator::up(&self.conn, None).await?;
		info!("Database migrations completed successfully");
		Ok(())
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}
}
