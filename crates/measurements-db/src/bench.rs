//! Side-by-side timing of the two bulk-insert strategies.

use std::time::{Duration, Instant};

use measurements_common::{Result, SensorId};

use crate::pool::Database;
use crate::queries::measurements::{bulk_insert_batched, bulk_insert_unbatched};

/// Sensor written by the unbatched run.
pub const UNBATCHED_SENSOR: SensorId = SensorId::new(1);
/// Sensor written by the batched run.
pub const BATCHED_SENSOR: SensorId = SensorId::new(3);
/// Unit tagged onto every generated row.
pub const BENCH_UNIT: &str = "insertionSpeedTest";

/// Wall-clock time spent by each strategy for the same row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertTimings {
    pub amount: usize,
    pub unbatched: Duration,
    pub batched: Duration,
}

impl InsertTimings {
    /// How many times faster the batched run was.
    pub fn speedup(&self) -> f64 {
        let batched = self.batched.as_secs_f64();
        if batched == 0.0 {
            return f64::INFINITY;
        }
        self.unbatched.as_secs_f64() / batched
    }
}

/// Insert `amount` rows with each strategy and report the elapsed times.
///
/// Writes `2 * amount` rows in total; they are left in place.
pub fn compare_insert_strategies(db: &Database, amount: usize) -> Result<InsertTimings> {
    let start = Instant::now();
    {
        let conn = db.conn()?;
        bulk_insert_unbatched(&conn, amount, UNBATCHED_SENSOR, BENCH_UNIT)?;
    }
    let unbatched = start.elapsed();
    tracing::info!(amount, "no tx, no prepared stmt: {unbatched:?}");

    let start = Instant::now();
    db.run_in_transaction(|tx| bulk_insert_batched(tx, amount, BATCHED_SENSOR, BENCH_UNIT))?;
    let batched = start.elapsed();
    tracing::info!(amount, "tx, prepared stmt: {batched:?}");

    Ok(InsertTimings {
        amount,
        unbatched,
        batched,
    })
}
