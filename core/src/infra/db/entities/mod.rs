//! Database entities

pub mod offence;
pub mod sdrs_load_result;
pub mod sdrs_load_result_history;
