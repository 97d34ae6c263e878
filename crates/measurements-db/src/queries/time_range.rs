//! Builder for the experiment measurement query with optional time bounds.

use measurements_common::time::{format_timestamp, parse_timestamp};
use measurements_common::Result;

const BASE_QUERY: &str = "SELECT measurements.value, measurements.unit, measurements.timestamp
     FROM measurements
     INNER JOIN sensors     ON measurements.sensor_id = sensors.id
     INNER JOIN experiments ON sensors.experiment_id  = experiments.id
     WHERE experiments.name = ?";

/// SQL text plus its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Build the measurements-by-experiment query.
///
/// The experiment name is always the first parameter. A non-empty
/// `start_time` / `end_time` (`YYYY-MM-DD HH:MM:SS`) adds an inclusive lower /
/// upper bound on the measurement timestamp, in that order. A bound that does
/// not parse yields a validation error and no query.
pub fn build_time_range_query(
    experiment_name: &str,
    start_time: &str,
    end_time: &str,
) -> Result<TimeRangeQuery> {
    let mut sql = String::from(BASE_QUERY);
    let mut params = Vec::with_capacity(3);
    params.push(experiment_name.to_string());

    if !start_time.is_empty() {
        let start = parse_timestamp("startTime", start_time)?;
        sql.push_str(" AND measurements.timestamp >= ?");
        params.push(format_timestamp(&start));
    }

    if !end_time.is_empty() {
        let end = parse_timestamp("endTime", end_time)?;
        sql.push_str(" AND measurements.timestamp <= ?");
        params.push(format_timestamp(&end));
    }

    sql.push_str(" ORDER BY measurements.id");
    Ok(TimeRangeQuery { sql, params })
}
