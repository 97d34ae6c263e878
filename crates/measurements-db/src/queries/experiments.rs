//! Experiment and sensor lookups, and the per-experiment measurement query.

use measurements_common::{Error, Result};
use rusqlite::Connection;

use crate::models::{Experiment, MeasurementReading, Sensor};
use crate::queries::time_range::build_time_range_query;

/// Check whether an experiment with `name` exists.
pub fn experiment_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM experiments WHERE name = ?1)",
        [name],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(format!("check experiment '{name}' exists"), e))
}

/// List all experiments in id order.
pub fn list_experiments(conn: &Connection) -> Result<Vec<Experiment>> {
    let mut stmt = conn
        .prepare("SELECT id, name, description, date FROM experiments ORDER BY id")
        .map_err(|e| Error::database("list experiments", e))?;
    let rows = stmt
        .query_map([], Experiment::from_row)
        .map_err(|e| Error::database("list experiments", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database("scan experiment row", e))?;
    Ok(rows)
}

/// List all sensors in id order.
pub fn list_sensors(conn: &Connection) -> Result<Vec<Sensor>> {
    let mut stmt = conn
        .prepare("SELECT id, experiment_id, sensor_type FROM sensors ORDER BY id")
        .map_err(|e| Error::database("list sensors", e))?;
    let rows = stmt
        .query_map([], Sensor::from_row)
        .map_err(|e| Error::database("list sensors", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database("scan sensor row", e))?;
    Ok(rows)
}

/// Fetch the readings of every sensor of an experiment, optionally bounded
/// by an inclusive time range.
///
/// Empty `start_time` / `end_time` leave that side open. Malformed bounds
/// are rejected before any statement runs, and an unknown experiment is
/// reported as not found rather than as an empty result.
pub fn measurements_for_experiment(
    conn: &Connection,
    experiment_name: &str,
    start_time: &str,
    end_time: &str,
) -> Result<Vec<MeasurementReading>> {
    if experiment_name.trim().is_empty() {
        return Err(Error::validation("experiment name must not be empty"));
    }

    let query = build_time_range_query(experiment_name, start_time, end_time)?;

    if !experiment_exists(conn, experiment_name)? {
        return Err(Error::not_found("experiment", experiment_name));
    }

    tracing::debug!(sql = %query.sql, params = ?query.params, "Querying experiment measurements");

    let context = format!("query measurements of experiment '{experiment_name}'");
    let mut stmt = conn
        .prepare(&query.sql)
        .map_err(|e| Error::database(context.as_str(), e))?;
    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(query.params.iter()),
            MeasurementReading::from_row,
        )
        .map_err(|e| Error::database(context.as_str(), e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(context.as_str(), e))?;
    Ok(rows)
}
