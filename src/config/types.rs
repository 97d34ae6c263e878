use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub bench: BenchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file (created on first start)
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Number of pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("experiments.db")
}

fn default_pool_size() -> u32 {
    measurements_db::pool::DEFAULT_POOL_SIZE
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchConfig {
    /// Rows written per strategy by `bench-insert` when no amount is given
    #[serde(default = "default_bench_amount")]
    pub amount: usize,
}

fn default_bench_amount() -> usize {
    1000
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            amount: default_bench_amount(),
        }
    }
}
