//! Measurements-Common: shared types and utilities.
//!
//! This crate provides functionality used by both the storage crate and the
//! command-line front end:
//!
//! - **Error Handling**: the unified [`Error`] type and [`Result`] alias
//! - **Typed IDs**: integer newtypes for experiments, sensors, and measurements
//! - **Time**: the stored timestamp/date layouts and a validating parser
//!
//! # Examples
//!
//! ```
//! use measurements_common::{Error, MeasurementId, Result};
//! use measurements_common::time::parse_timestamp;
//!
//! let id = MeasurementId::new(1);
//! assert_eq!(id.get(), 1);
//!
//! assert!(parse_timestamp("startTime", "2024-01-01 00:00:00").is_ok());
//!
//! let example = || -> Result<()> {
//!     Err(Error::not_found("measurement", id))
//! };
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod time;

pub use error::{Error, Result};
pub use ids::*;
