//! Baseline experiments and sensors loaded at startup.
//!
//! Rows carry fixed ids and are written with `INSERT OR IGNORE`, so loading
//! into an already-seeded database changes nothing.

use chrono::NaiveDate;
use measurements_common::time::format_date;
use measurements_common::{Error, ExperimentId, Result, SensorId};
use rusqlite::Transaction;

struct SeedExperiment {
    id: ExperimentId,
    name: &'static str,
    description: &'static str,
    /// Days before the seeding date.
    days_ago: u64,
}

struct SeedSensor {
    id: SensorId,
    experiment_id: ExperimentId,
    sensor_type: &'static str,
}

const EXPERIMENTS: &[SeedExperiment] = &[
    SeedExperiment {
        id: ExperimentId::new(1),
        name: "Exp1",
        description: "the first experiment",
        days_ago: 1,
    },
    SeedExperiment {
        id: ExperimentId::new(2),
        name: "Exp2",
        description: "the second experiment",
        days_ago: 0,
    },
];

const SENSORS: &[SeedSensor] = &[
    SeedSensor {
        id: SensorId::new(1),
        experiment_id: ExperimentId::new(1),
        sensor_type: "Barometer",
    },
    SeedSensor {
        id: SensorId::new(2),
        experiment_id: ExperimentId::new(1),
        sensor_type: "Thermometer",
    },
    SeedSensor {
        id: SensorId::new(3),
        experiment_id: ExperimentId::new(2),
        sensor_type: "Barometer",
    },
    SeedSensor {
        id: SensorId::new(4),
        experiment_id: ExperimentId::new(2),
        sensor_type: "Thermometer",
    },
];

/// Insert the baseline experiments and sensors that are not present yet.
///
/// `today` anchors the experiment dates: the first experiment is dated the
/// day before, the second on `today` itself. Returns the number of rows
/// actually written.
pub fn seed_baseline(tx: &Transaction<'_>, today: NaiveDate) -> Result<usize> {
    let mut inserted = 0;

    for exp in EXPERIMENTS {
        let date = today
            .checked_sub_days(chrono::Days::new(exp.days_ago))
            .ok_or_else(|| Error::internal(format!("cannot date experiment {}", exp.name)))?;

        inserted += tx
            .execute(
                "INSERT OR IGNORE INTO experiments (id, name, description, date)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![exp.id.get(), exp.name, exp.description, format_date(&date)],
            )
            .map_err(|e| Error::database(format!("seed experiment {}", exp.id), e))?;
    }

    let mut stmt = tx
        .prepare(
            "INSERT OR IGNORE INTO sensors (id, experiment_id, sensor_type)
             VALUES (?1, ?2, ?3)",
        )
        .map_err(|e| Error::database("prepare sensor seed", e))?;

    for sensor in SENSORS {
        inserted += stmt
            .execute(rusqlite::params![
                sensor.id.get(),
                sensor.experiment_id.get(),
                sensor.sensor_type
            ])
            .map_err(|e| Error::database(format!("seed sensor {}", sensor.id), e))?;
    }

    if inserted > 0 {
        tracing::info!("Seeded {inserted} baseline rows");
    } else {
        tracing::debug!("Seed rows already present");
    }

    Ok(inserted)
}
