//! Database query modules.
//!
//! - measurements: measurement CRUD, min/max, row count, bulk inserts
//! - experiments: experiment/sensor lookups and the per-experiment query
//! - time_range: SQL builder for the time-bounded experiment query

pub mod experiments;
pub mod measurements;
pub mod time_range;
