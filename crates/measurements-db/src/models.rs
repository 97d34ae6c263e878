//! Rust structs mapping to database tables.
//!
//! Each row model implements `from_row` for constructing itself from a
//! `rusqlite::Row` whose columns are selected in declaration order.

use chrono::NaiveDateTime;
use measurements_common::time::{format_timestamp, parse_timestamp};
use measurements_common::{Error, ExperimentId, MeasurementId, Result, SensorId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Experiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
}

impl Experiment {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: ExperimentId::new(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub experiment_id: ExperimentId,
    pub sensor_type: String,
}

impl Sensor {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: SensorId::new(row.get(0)?),
            experiment_id: ExperimentId::new(row.get(1)?),
            sensor_type: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// A single reading taken by a sensor.
///
/// `id` and `timestamp` are assigned by the database on insert; a value built
/// with [`Measurement::new`] carries the defaults until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub id: MeasurementId,
    pub sensor_id: SensorId,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Measurement {
    /// Build a measurement that has not been stored yet.
    pub fn new(sensor_id: SensorId, value: f64, unit: impl Into<String>) -> Self {
        Self {
            id: MeasurementId::default(),
            sensor_id,
            value,
            unit: unit.into(),
            timestamp: String::new(),
        }
    }

    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: MeasurementId::new(row.get(0)?),
            sensor_id: SensorId::new(row.get(1)?),
            value: row.get(2)?,
            unit: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }
}

/// The value/unit/timestamp projection returned by experiment queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReading {
    pub value: f64,
    pub unit: String,
    pub timestamp: String,
}

impl MeasurementReading {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            value: row.get(0)?,
            unit: row.get(1)?,
            timestamp: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// MeasurementUpdate
// ---------------------------------------------------------------------------

/// The columns a measurement update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementField {
    Value,
    Unit,
    Timestamp,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 3] = [Self::Value, Self::Unit, Self::Timestamp];

    /// The column name in the `measurements` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Unit => "unit",
            Self::Timestamp => "timestamp",
        }
    }

    /// Look up an updatable field by its column name.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

/// A partial update of a measurement.
///
/// Only the fields set to `Some` are written. Any other column (including
/// `id` and `sensor_id`) cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementUpdate {
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

impl MeasurementUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.unit.is_none() && self.timestamp.is_none()
    }

    /// Build an update from a JSON object of column name to new value, as
    /// received from an API request body.
    ///
    /// Unknown or non-updatable field names and values of the wrong JSON type
    /// are rejected. An empty object yields an empty update.
    pub fn from_fields(fields: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let mut update = Self::default();

        for (name, raw) in fields {
            let field = MeasurementField::from_column(name).ok_or_else(|| {
                Error::validation(format!("field '{name}' cannot be updated"))
            })?;

            match field {
                MeasurementField::Value => {
                    let value = raw.as_f64().ok_or_else(|| {
                        Error::validation(format!("field 'value' must be a number, got {raw}"))
                    })?;
                    update.value = Some(value);
                }
                MeasurementField::Unit => {
                    let unit = raw.as_str().ok_or_else(|| {
                        Error::validation(format!("field 'unit' must be a string, got {raw}"))
                    })?;
                    update.unit = Some(unit.to_string());
                }
                MeasurementField::Timestamp => {
                    let text = raw.as_str().ok_or_else(|| {
                        Error::validation(format!("field 'timestamp' must be a string, got {raw}"))
                    })?;
                    update.timestamp = Some(parse_timestamp("timestamp", text)?);
                }
            }
        }

        Ok(update)
    }

    /// Validate and flatten the update into `(field, bound value)` pairs in
    /// column order.
    pub fn assignments(&self) -> Result<Vec<(MeasurementField, rusqlite::types::Value)>> {
        use rusqlite::types::Value;

        if self.is_empty() {
            return Err(Error::validation("update requires at least one field"));
        }

        let mut out = Vec::with_capacity(MeasurementField::ALL.len());
        if let Some(value) = self.value {
            validate_value(value)?;
            out.push((MeasurementField::Value, Value::Real(value)));
        }
        if let Some(unit) = &self.unit {
            validate_unit(unit)?;
            out.push((MeasurementField::Unit, Value::Text(unit.clone())));
        }
        if let Some(ts) = &self.timestamp {
            out.push((MeasurementField::Timestamp, Value::Text(format_timestamp(ts))));
        }
        Ok(out)
    }
}

/// Reject values SQLite cannot store as REAL.
pub(crate) fn validate_value(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(format!("value must be a finite number, got {value}")))
    }
}

pub(crate) fn validate_unit(unit: &str) -> Result<()> {
    if unit.trim().is_empty() {
        Err(Error::validation("unit must not be empty"))
    } else {
        Ok(())
    }
}
