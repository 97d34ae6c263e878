//! Measurement CRUD, aggregates, and bulk inserts.

use measurements_common::{Error, MeasurementId, Result, SensorId};
use rand::Rng;
use rusqlite::{Connection, Transaction};

use crate::models::{validate_unit, validate_value, Measurement, MeasurementUpdate};

const COLUMNS: &str = "id, sensor_id, value, unit, timestamp";

const INSERT_SQL: &str = "INSERT INTO measurements (sensor_id, value, unit) VALUES (?1, ?2, ?3)";

/// Insert a measurement and write the generated id and timestamp back onto it.
///
/// Fails with a database error when `sensor_id` does not reference an
/// existing sensor.
pub fn insert_measurement(conn: &Connection, m: &mut Measurement) -> Result<MeasurementId> {
    validate_value(m.value)?;
    validate_unit(&m.unit)?;

    let (id, timestamp): (i64, String) = conn
        .query_row(
            &format!("{INSERT_SQL} RETURNING id, timestamp"),
            rusqlite::params![m.sensor_id.get(), m.value, m.unit],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(|e| {
            Error::database(format!("insert measurement for sensor {}", m.sensor_id), e)
        })?;

    m.id = MeasurementId::new(id);
    m.timestamp = timestamp;
    tracing::debug!(id, sensor_id = %m.sensor_id, "Inserted measurement");
    Ok(m.id)
}

/// List every measurement in id order.
pub fn list_measurements(conn: &Connection) -> Result<Vec<Measurement>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {COLUMNS} FROM measurements ORDER BY id"))
        .map_err(|e| Error::database("list measurements", e))?;
    let rows = stmt
        .query_map([], Measurement::from_row)
        .map_err(|e| Error::database("list measurements", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database("scan measurement row", e))?;
    Ok(rows)
}

/// Get a measurement by id.
pub fn get_measurement(conn: &Connection, id: MeasurementId) -> Result<Measurement> {
    let result = conn.query_row(
        &format!("SELECT {COLUMNS} FROM measurements WHERE id = ?1"),
        [id.get()],
        Measurement::from_row,
    );
    match result {
        Ok(m) => Ok(m),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::not_found("measurement", id)),
        Err(e) => Err(Error::database(format!("get measurement {id}"), e)),
    }
}

/// Delete a measurement by id.
///
/// SQLite reports success for a delete that matches nothing, so the affected
/// row count is the existence check.
pub fn delete_measurement(conn: &Connection, id: MeasurementId) -> Result<()> {
    let n = conn
        .execute("DELETE FROM measurements WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(format!("delete measurement {id}"), e))?;
    if n == 0 {
        return Err(Error::not_found("measurement", id));
    }
    Ok(())
}

/// Apply a partial update to a measurement.
///
/// An empty update is rejected before any SQL is built. Only the columns set
/// in `update` appear in the statement.
pub fn update_measurement(
    conn: &Connection,
    id: MeasurementId,
    update: &MeasurementUpdate,
) -> Result<()> {
    let assignments = update.assignments()?;

    let set_clause = assignments
        .iter()
        .enumerate()
        .map(|(i, (field, _))| format!("{} = ?{}", field.column(), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE measurements SET {set_clause} WHERE id = ?{}",
        assignments.len() + 1
    );

    let mut params: Vec<rusqlite::types::Value> =
        assignments.into_iter().map(|(_, value)| value).collect();
    params.push(rusqlite::types::Value::Integer(id.get()));

    let n = conn
        .execute(&sql, rusqlite::params_from_iter(params))
        .map_err(|e| Error::database(format!("update measurement {id}"), e))?;
    if n == 0 {
        return Err(Error::not_found("measurement", id));
    }
    Ok(())
}

/// Return every measurement whose value equals the current minimum or maximum.
///
/// Ties are all returned, so the result may hold more than two rows. An
/// empty table gives an empty result.
pub fn min_max_measurements(conn: &Connection) -> Result<Vec<Measurement>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM measurements
             WHERE value = (SELECT MAX(value) FROM measurements)
                OR value = (SELECT MIN(value) FROM measurements)
             ORDER BY id"
        ))
        .map_err(|e| Error::database("query min/max", e))?;
    let rows = stmt
        .query_map([], Measurement::from_row)
        .map_err(|e| Error::database("query min/max", e))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database("scan min/max row", e))?;
    Ok(rows)
}

/// Count all measurement rows. An empty table counts as zero.
pub fn count_measurements(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))
        .map_err(|e| Error::database("count measurements", e))
}

/// Insert `amount` random measurements, one independent statement each.
///
/// No transaction and no statement reuse: every row pays the full parse and
/// commit cost. There is no upper bound on `amount` and no way to stop the
/// loop early. Returns the number of rows written.
pub fn bulk_insert_unbatched(
    conn: &Connection,
    amount: usize,
    sensor_id: SensorId,
    unit: &str,
) -> Result<usize> {
    validate_unit(unit)?;
    let mut rng = rand::thread_rng();

    for i in 0..amount {
        let value: f64 = rng.gen_range(0.0..100.0);
        conn.execute(INSERT_SQL, rusqlite::params![sensor_id.get(), value, unit])
            .map_err(|e| {
                Error::database(format!("unbatched insert {i} for sensor {sensor_id}"), e)
            })?;
    }
    Ok(amount)
}

/// Insert `amount` random measurements inside `tx` with one prepared statement.
///
/// Produces the same rows as [`bulk_insert_unbatched`]; only the write
/// strategy differs. Nothing is visible until the caller commits `tx`.
pub fn bulk_insert_batched(
    tx: &Transaction<'_>,
    amount: usize,
    sensor_id: SensorId,
    unit: &str,
) -> Result<usize> {
    validate_unit(unit)?;
    let mut rng = rand::thread_rng();

    let mut stmt = tx
        .prepare(INSERT_SQL)
        .map_err(|e| Error::database("prepare batched insert", e))?;

    for i in 0..amount {
        let value: f64 = rng.gen_range(0.0..100.0);
        stmt.execute(rusqlite::params![sensor_id.get(), value, unit])
            .map_err(|e| {
                Error::database(format!("batched insert {i} for sensor {sensor_id}"), e)
            })?;
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Database;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use measurements_common::time::parse_timestamp;

    fn insert(conn: &Connection, sensor: i64, value: f64, unit: &str) -> Measurement {
        let mut m = Measurement::new(SensorId::new(sensor), value, unit);
        insert_measurement(conn, &mut m).unwrap();
        m
    }

    #[test]
    fn insert_then_get_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();

        let before = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut m = Measurement::new(SensorId::new(2), 21.75, "C");
        let id = insert_measurement(&conn, &mut m).unwrap();
        assert_eq!(m.id, id);
        assert!(id.get() > 0);

        let fetched = get_measurement(&conn, id).unwrap();
        assert_eq!(fetched.value, 21.75);
        assert_eq!(fetched.unit, "C");
        assert_eq!(fetched.sensor_id, SensorId::new(2));
        assert_eq!(fetched.timestamp, m.timestamp);
        assert!(fetched.timestamp >= before);
    }

    #[test]
    fn insert_unknown_sensor_is_database_error() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();

        let mut m = Measurement::new(SensorId::new(99), 1.0, "C");
        let err = insert_measurement(&conn, &mut m).unwrap_err();
        assert_matches!(err, Error::Database { ref context, .. } if context.contains("sensor 99"));
        assert_eq!(m.id.get(), 0);
        assert_eq!(count_measurements(&conn).unwrap(), 0);
    }

    #[test]
    fn insert_rejects_invalid_input() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();

        let mut nan = Measurement::new(SensorId::new(1), f64::NAN, "C");
        assert_matches!(insert_measurement(&conn, &mut nan), Err(Error::Validation(_)));
        let mut blank = Measurement::new(SensorId::new(1), 1.0, "");
        assert_matches!(insert_measurement(&conn, &mut blank), Err(Error::Validation(_)));
        assert_eq!(count_measurements(&conn).unwrap(), 0);
    }

    #[test]
    fn list_empty_then_populated() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        assert!(list_measurements(&conn).unwrap().is_empty());

        let a = insert(&conn, 1, 1.0, "hPa");
        let b = insert(&conn, 3, 2.0, "hPa");
        let ids: Vec<_> = list_measurements(&conn).unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn get_missing_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let err = get_measurement(&conn, MeasurementId::new(404)).unwrap_err();
        assert_matches!(err, Error::NotFound { ref entity, ref id } if entity == "measurement" && id == "404");
    }

    #[test]
    fn delete_existing_and_missing() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let m = insert(&conn, 1, 5.0, "hPa");
        insert(&conn, 1, 6.0, "hPa");

        let err = delete_measurement(&conn, MeasurementId::new(m.id.get() + 100)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(count_measurements(&conn).unwrap(), 2);

        delete_measurement(&conn, m.id).unwrap();
        assert_eq!(count_measurements(&conn).unwrap(), 1);
        assert!(get_measurement(&conn, m.id).unwrap_err().is_not_found());

        // Second delete of the same id finds nothing.
        assert!(delete_measurement(&conn, m.id).unwrap_err().is_not_found());
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let m = insert(&conn, 2, 10.0, "C");

        update_measurement(&conn, m.id, &MeasurementUpdate::new().value(11.5)).unwrap();
        let after = get_measurement(&conn, m.id).unwrap();
        assert_eq!(after.value, 11.5);
        assert_eq!(after.unit, "C");
        assert_eq!(after.timestamp, m.timestamp);

        let ts = parse_timestamp("timestamp", "2023-12-24 18:00:00").unwrap();
        update_measurement(&conn, m.id, &MeasurementUpdate::new().unit("K").timestamp(ts))
            .unwrap();
        let after = get_measurement(&conn, m.id).unwrap();
        assert_eq!(after.value, 11.5);
        assert_eq!(after.unit, "K");
        assert_eq!(after.timestamp, "2023-12-24 18:00:00");
    }

    #[test]
    fn empty_update_is_rejected_without_mutation() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let m = insert(&conn, 2, 10.0, "C");

        let err = update_measurement(&conn, m.id, &MeasurementUpdate::new()).unwrap_err();
        assert_matches!(err, Error::Validation(_));
        assert_eq!(count_measurements(&conn).unwrap(), 1);
        assert_eq!(get_measurement(&conn, m.id).unwrap(), m);

        // Validation wins even for an id that does not exist.
        let err = update_measurement(&conn, MeasurementId::new(999), &MeasurementUpdate::new())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn update_missing_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        let err = update_measurement(&conn, MeasurementId::new(7), &MeasurementUpdate::new().value(1.0))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn min_max_unique_extremes() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        assert!(min_max_measurements(&conn).unwrap().is_empty());

        let low = insert(&conn, 1, -3.0, "C");
        insert(&conn, 1, 4.0, "C");
        let high = insert(&conn, 1, 40.0, "C");
        insert(&conn, 1, 12.0, "C");

        let ids: Vec<_> = min_max_measurements(&conn).unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![low.id, high.id]);
    }

    #[test]
    fn min_max_returns_all_ties() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        for v in [1.0, 9.0, 5.0, 1.0, 9.0, 9.0] {
            insert(&conn, 2, v, "C");
        }

        let rows = min_max_measurements(&conn).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|m| m.value == 1.0 || m.value == 9.0));
    }

    #[test]
    fn min_max_single_row() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        insert(&conn, 2, 3.0, "C");
        assert_eq!(min_max_measurements(&conn).unwrap().len(), 1);
    }

    #[test]
    fn bulk_unbatched_inserts_exact_amount() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();

        let n = bulk_insert_unbatched(&conn, 100, SensorId::new(1), "bulk").unwrap();
        assert_eq!(n, 100);
        assert_eq!(count_measurements(&conn).unwrap(), 100);

        let rows = list_measurements(&conn).unwrap();
        assert!(rows
            .iter()
            .all(|m| m.sensor_id == SensorId::new(1) && m.unit == "bulk"));
        assert!(rows.iter().all(|m| (0.0..100.0).contains(&m.value)));
    }

    #[test]
    fn bulk_batched_inserts_exact_amount() {
        let db = Database::open_in_memory().unwrap();

        let n = db
            .run_in_transaction(|tx| bulk_insert_batched(tx, 100, SensorId::new(3), "bulk"))
            .unwrap();
        assert_eq!(n, 100);

        let conn = db.conn().unwrap();
        assert_eq!(count_measurements(&conn).unwrap(), 100);
        let rows = list_measurements(&conn).unwrap();
        assert!(rows
            .iter()
            .all(|m| m.sensor_id == SensorId::new(3) && m.unit == "bulk"));
    }

    #[test]
    fn bulk_batched_unknown_sensor_commits_nothing() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .run_in_transaction(|tx| bulk_insert_batched(tx, 10, SensorId::new(77), "bulk"))
            .unwrap_err();
        assert_matches!(err, Error::Database { .. });

        let conn = db.conn().unwrap();
        assert_eq!(count_measurements(&conn).unwrap(), 0);
    }

    #[test]
    fn bulk_zero_amount_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        assert_eq!(bulk_insert_unbatched(&conn, 0, SensorId::new(1), "x").unwrap(), 0);
        assert_eq!(count_measurements(&conn).unwrap(), 0);
    }
}
