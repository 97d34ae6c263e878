mod cli;

use measurements::config;
use measurements_common::time::parse_timestamp;
use measurements_common::{MeasurementId, SensorId};
use measurements_db::models::{Measurement, MeasurementUpdate};
use measurements_db::queries::{experiments, measurements as store};
use measurements_db::{bench, Database};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "measurements=debug,measurements_db=debug,measurements_common=debug".to_string()
        } else {
            "measurements=info,measurements_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    let open = || open_database(&config);

    match cli.command {
        Commands::Init => {
            let db = open()?;
            let conn = db.conn()?;
            let experiment_rows = experiments::list_experiments(&conn)?;
            let sensor_rows = experiments::list_sensors(&conn)?;
            println!(
                "Database ready: {} experiments, {} sensors, {} measurements",
                experiment_rows.len(),
                sensor_rows.len(),
                store::count_measurements(&conn)?
            );
            Ok(())
        }
        Commands::Count => {
            let db = open()?;
            let conn = db.conn()?;
            println!("{}", store::count_measurements(&conn)?);
            Ok(())
        }
        Commands::Insert {
            sensor,
            value,
            unit,
        } => insert(&open()?, SensorId::new(sensor), value, unit),
        Commands::List => {
            let db = open()?;
            let conn = db.conn()?;
            print_json(&store::list_measurements(&conn)?)
        }
        Commands::Get { id } => {
            let db = open()?;
            let conn = db.conn()?;
            print_json(&store::get_measurement(&conn, MeasurementId::new(id))?)
        }
        Commands::Delete { id } => {
            let db = open()?;
            let conn = db.conn()?;
            store::delete_measurement(&conn, MeasurementId::new(id))?;
            println!("Deleted measurement {id}");
            Ok(())
        }
        Commands::Update {
            id,
            value,
            unit,
            timestamp,
        } => update(&open()?, MeasurementId::new(id), value, unit, timestamp),
        Commands::MinMax => {
            let db = open()?;
            let conn = db.conn()?;
            let start = Instant::now();
            let rows = store::min_max_measurements(&conn)?;
            tracing::info!("Min/max query returned {} rows in {:?}", rows.len(), start.elapsed());
            print_json(&rows)
        }
        Commands::Query {
            experiment,
            start,
            end,
        } => {
            let db = open()?;
            let conn = db.conn()?;
            let rows = experiments::measurements_for_experiment(&conn, &experiment, &start, &end)?;
            print_json(&rows)
        }
        Commands::Experiments => list_experiments(&open()?),
        Commands::BenchInsert { amount } => {
            let amount = amount.unwrap_or(config.bench.amount);
            bench_insert(&open()?, amount)
        }
        Commands::Version => {
            println!("measurements {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Open the database and log the current row count.
///
/// Schema or seed failures abort startup.
fn open_database(config: &config::Config) -> Result<Database> {
    let db = Database::open(&config.database.path, config.database.pool_size)?;

    let start = Instant::now();
    let rows = store::count_measurements(&*db.conn()?)?;
    tracing::info!("measurement rows: {rows}; time {:?}", start.elapsed());

    Ok(db)
}

fn insert(db: &Database, sensor_id: SensorId, value: f64, unit: String) -> Result<()> {
    let conn = db.conn()?;
    let mut measurement = Measurement::new(sensor_id, value, unit);
    let id = store::insert_measurement(&conn, &mut measurement)?;
    tracing::info!("Created measurement {id}");
    print_json(&measurement)
}

fn update(
    db: &Database,
    id: MeasurementId,
    value: Option<f64>,
    unit: Option<String>,
    timestamp: Option<String>,
) -> Result<()> {
    let mut changes = MeasurementUpdate::new();
    changes.value = value;
    changes.unit = unit;
    if let Some(ts) = timestamp {
        changes.timestamp = Some(parse_timestamp("timestamp", &ts)?);
    }

    let conn = db.conn()?;
    store::update_measurement(&conn, id, &changes)?;
    print_json(&store::get_measurement(&conn, id)?)
}

fn list_experiments(db: &Database) -> Result<()> {
    #[derive(Serialize)]
    struct ExperimentWithSensors {
        #[serde(flatten)]
        experiment: measurements_db::models::Experiment,
        sensors: Vec<measurements_db::models::Sensor>,
    }

    let conn = db.conn()?;
    let sensors = experiments::list_sensors(&conn)?;
    let listing: Vec<_> = experiments::list_experiments(&conn)?
        .into_iter()
        .map(|experiment| ExperimentWithSensors {
            sensors: sensors
                .iter()
                .filter(|s| s.experiment_id == experiment.id)
                .cloned()
                .collect(),
            experiment,
        })
        .collect();
    print_json(&listing)
}

fn bench_insert(db: &Database, amount: usize) -> Result<()> {
    let timings = bench::compare_insert_strategies(db, amount)?;

    println!("Inserts per strategy: {}", timings.amount);
    println!("  no tx, no prepared stmt: {:?}", timings.unbatched);
    println!("  tx, prepared stmt:       {:?}", timings.batched);
    println!("  speedup:                 {:.1}x", timings.speedup());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
