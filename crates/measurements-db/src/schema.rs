//! Table definitions and foreign-key enforcement.
//!
//! The schema is created with `CREATE ... IF NOT EXISTS` statements, so
//! running it against an existing database is a no-op.

use measurements_common::{Error, Result};
use rusqlite::{Connection, Transaction};

/// Tables created at startup, in dependency order.
pub const TABLES: [&str; 3] = ["experiments", "sensors", "measurements"];

const CREATE_STATEMENTS: &[(&str, &str)] = &[
    (
        "experiments",
        "CREATE TABLE IF NOT EXISTS experiments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            date        TEXT NOT NULL DEFAULT CURRENT_DATE
        )",
    ),
    (
        "sensors",
        "CREATE TABLE IF NOT EXISTS sensors (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            experiment_id INTEGER NOT NULL REFERENCES experiments(id),
            sensor_type   TEXT NOT NULL
        )",
    ),
    (
        "measurements",
        "CREATE TABLE IF NOT EXISTS measurements (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            sensor_id INTEGER NOT NULL REFERENCES sensors(id),
            value     REAL NOT NULL,
            unit      TEXT NOT NULL,
            timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    ),
    (
        "idx_measurements_sensor_time",
        "CREATE INDEX IF NOT EXISTS idx_measurements_sensor_time
            ON measurements(sensor_id, timestamp)",
    ),
];

/// Turn on foreign-key enforcement for this connection.
///
/// SQLite ignores this pragma inside an open transaction, so it must run on
/// the bare connection before any unit of work starts.
pub fn enable_foreign_keys(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Report whether foreign-key enforcement is active on `conn`.
pub fn foreign_keys_enabled(conn: &Connection) -> Result<bool> {
    conn.query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
        .map(|flag| flag == 1)
        .map_err(|e| Error::database("read foreign_keys pragma", e))
}

/// Create all tables and indexes that do not exist yet.
pub fn create_tables(tx: &Transaction<'_>) -> Result<()> {
    for (name, sql) in CREATE_STATEMENTS {
        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("create {name}"), e))?;
    }
    tracing::debug!("Schema ready ({} statements)", CREATE_STATEMENTS.len());
    Ok(())
}
