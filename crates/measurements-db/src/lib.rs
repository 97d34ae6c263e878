//! Measurements-DB: schema, seed data, and query operations
//!
//! This crate stores experiments, their sensors, and sensor measurements in
//! SQLite, using rusqlite with an r2d2 connection pool.
//!
//! # Modules
//!
//! - `pool` - The [`Database`] handle and scoped transactions
//! - `schema` - Idempotent table creation and foreign-key enforcement
//! - `seed` - Fixed baseline experiments and sensors
//! - `models` - Rust models matching the database schema
//! - `queries` - Measurement CRUD, aggregates, bulk inserts, experiment lookups
//! - `bench` - Timing comparison of the bulk-insert strategies
//!
//! # Example
//!
//! ```
//! use measurements_db::models::Measurement;
//! use measurements_db::queries::measurements;
//! use measurements_db::Database;
//! use measurements_common::SensorId;
//!
//! let db = Database::open_in_memory().unwrap();
//! let conn = db.conn().unwrap();
//!
//! let mut m = Measurement::new(SensorId::new(1), 1013.2, "hPa");
//! let id = measurements::insert_measurement(&conn, &mut m).unwrap();
//! assert_eq!(measurements::get_measurement(&conn, id).unwrap().unit, "hPa");
//! ```

pub mod bench;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod seed;

pub use pool::Database;
