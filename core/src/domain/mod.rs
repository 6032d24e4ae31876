//! Core domain models
//!
//! Plain data structs shared by the sync engine and every store backend:
//! - Offence is the current view of one offence code
//! - Partition is one of the 26 registry caches (A-Z)
//! - PartitionLoadStatus and PartitionLoadHistory record sync attempts

pub mod load;
pub mod offence;
pub mod partition;

// Re-export commonly used types
pub use load::{LoadAttempt, LoadStatus, LoadType, PartitionLoadHistory, PartitionLoadStatus};
pub use offence::{Offence, OffenceRevision, StoredOffence};
pub use partition::Partition;
