//! Offence registry sync
//!
//! Keeps a local store of offence reference records in line with the SDRS
//! registry. The catalogue is split into 26 partitions by the first letter of
//! the offence code; each partition tracks when it last loaded successfully so
//! that incremental runs only refetch what changed.
//!
//! Entry points:
//! - [`sync::SyncOrchestrator`] runs a full load or an incremental update
//! - [`service::SyncScheduler`] runs both periodically under job locks
//! - [`infra::db::SqlStore`] and [`store::MemoryStore`] persist the results

pub mod config;
pub mod domain;
pub mod infra;
pub mod service;
pub mod store;
pub mod sync;

pub use config::SyncConfig;
pub use domain::{Offence, Partition, PartitionLoadStatus};
pub use sync::{SyncOrchestrator, SyncReport};
