//! Infrastructure layer - external interfaces

pub mod db;
pub mod lock;
pub mod registry;
