//! Database handle and scoped transactions.
//!
//! [`Database`] owns an r2d2 pool of SQLite connections. Opening it enables
//! foreign keys on every connection, creates the schema, and loads the seed
//! rows, each step inside its own transaction. Callers receive the handle by
//! value and pass it (or a checked-out connection) to the query functions.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use measurements_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{schema, seed};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Default number of pooled connections for file-backed databases.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// The process-lifetime database handle.
///
/// Cloning is cheap and shares the same underlying pool. The pool (and with
/// it every connection) is closed when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("max_size", &self.pool.max_size())
            .field("state", &self.pool.state())
            .finish()
    }
}

impl Database {
    /// Open (or create) a database file and prepare it for use.
    ///
    /// Runs schema creation and seeding; any failure there is returned and
    /// the handle is not produced.
    pub fn open(db_path: impl AsRef<Path>, pool_size: u32) -> Result<Self> {
        let db_path = db_path.as_ref();
        if db_path.as_os_str().is_empty() {
            return Err(Error::validation("database path must not be empty"));
        }
        if pool_size == 0 {
            return Err(Error::validation("pool size must be at least 1"));
        }

        tracing::info!("Opening database at {}", db_path.display());
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        Self::from_manager(manager, pool_size)
    }

    /// Open a private in-memory database (useful for tests).
    ///
    /// Each call creates a uniquely-named shared-cache in-memory database so
    /// that parallel tests do not interfere with each other, while all
    /// connections within one handle still see the same data.
    pub fn open_in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:measurements_mem_{n}?mode=memory&cache=shared");

        let manager = SqliteConnectionManager::file(uri).with_init(init_connection);
        Self::from_manager(manager, DEFAULT_POOL_SIZE)
    }

    fn from_manager(manager: SqliteConnectionManager, pool_size: u32) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| Error::database("create connection pool", e))?;

        let db = Self { pool };
        db.initialize()?;
        Ok(db)
    }

    /// Create tables and load seed rows, each in its own transaction.
    fn initialize(&self) -> Result<()> {
        let mut conn = self.conn()?;

        with_transaction(&mut conn, schema::create_tables)?;

        let today = Local::now().date_naive();
        let seeded = with_transaction(&mut conn, |tx| seed::seed_baseline(tx, today))?;
        tracing::debug!(seeded, "Database initialized");

        Ok(())
    }

    /// Check out a connection from the pool.
    pub fn conn(&self) -> Result<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| Error::database("get connection from pool", e))
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run `unit_of_work` inside a transaction on a pooled connection.
    ///
    /// Commits only when the closure returns `Ok`; see [`with_transaction`].
    pub fn run_in_transaction<T, F>(&self, unit_of_work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn()?;
        with_transaction(&mut conn, unit_of_work)
    }
}

/// Per-connection setup run by the pool for every new connection.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    schema::enable_foreign_keys(conn)
}

/// Run `unit_of_work` inside a transaction on `conn`.
///
/// The transaction is committed only if the closure returns `Ok`. On an
/// error it is rolled back before the error is returned; on a panic the
/// transaction guard rolls back while unwinding.
pub fn with_transaction<T, F>(conn: &mut Connection, unit_of_work: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| {
            tracing::error!("Failed to start transaction: {e}");
            Error::database("begin transaction", e)
        })?;

    match unit_of_work(&tx) {
        Ok(value) => {
            tx.commit().map_err(|e| {
                tracing::error!("Transaction commit failed: {e}");
                Error::database("commit transaction", e)
            })?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!("Transaction failed, rolling back: {err}");
            if let Err(e) = tx.rollback() {
                tracing::error!("Rollback failed: {e}");
            }
            Err(err)
        }
    }
}
