use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "measurements")]
#[command(author, version, about = "Sensor measurement store for experiments")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the schema and seed rows, then report the row count
    Init,

    /// Print the number of stored measurements
    Count,

    /// Store a single measurement
    Insert {
        /// Sensor that took the reading
        #[arg(long)]
        sensor: i64,

        /// Measured value
        #[arg(long, allow_hyphen_values = true)]
        value: f64,

        /// Unit of the value
        #[arg(long)]
        unit: String,
    },

    /// List all measurements as JSON
    List,

    /// Show one measurement
    Get {
        /// Measurement id
        id: i64,
    },

    /// Delete one measurement
    Delete {
        /// Measurement id
        id: i64,
    },

    /// Change the value, unit, or timestamp of a measurement
    Update {
        /// Measurement id
        id: i64,

        /// New value
        #[arg(long, allow_hyphen_values = true)]
        value: Option<f64>,

        /// New unit
        #[arg(long)]
        unit: Option<String>,

        /// New timestamp (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Show the measurements holding the minimum and maximum value
    MinMax,

    /// Show measurements of an experiment within an optional time range
    Query {
        /// Experiment name
        experiment: String,

        /// Inclusive lower bound (YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "")]
        start: String,

        /// Inclusive upper bound (YYYY-MM-DD HH:MM:SS)
        #[arg(long, default_value = "")]
        end: String,
    },

    /// List experiments and their sensors
    Experiments,

    /// Compare unbatched and batched bulk insert speed
    BenchInsert {
        /// Rows to write per strategy (defaults to bench.amount from config)
        #[arg(short, long)]
        amount: Option<usize>,
    },

    /// Display version information
    Version,
}
