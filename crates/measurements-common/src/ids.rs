//! Typed ID wrappers for the surrogate integer keys of each table.
//!
//! Each ID type is a newtype over `i64`, so a `SensorId` cannot be passed
//! where a `MeasurementId` is expected even though both are SQLite rowids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generate a newtype ID wrapper over `i64`.
///
/// The macro produces a struct with:
/// - `new(i64)` and `get()` to wrap and unwrap the raw rowid
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner integer
/// - `From<i64>` and `Into<i64>` conversions
/// - `Default` yielding 0, the value of a row not yet inserted
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Wrap a raw rowid.
                #[must_use]
                pub const fn new(id: i64) -> Self {
                    Self(id)
                }

                /// Return the raw rowid.
                #[must_use]
                pub const fn get(self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.trim().parse::<i64>().map(Self)
                }
            }

            impl From<i64> for $name {
                fn from(id: i64) -> Self {
                    Self(id)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Identifier of an experiment row.
    ExperimentId,
    /// Identifier of a sensor row.
    SensorId,
    /// Identifier of a measurement row.
    MeasurementId,
}
