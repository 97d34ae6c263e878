//! Configuration loading and validation.

use measurements::config::{load_config, load_config_or_default, parse_config, Config};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn empty_file_uses_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.database.path, PathBuf::from("experiments.db"));
    assert_eq!(config.database.pool_size, 4);
    assert_eq!(config.bench.amount, 1000);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config = parse_config(
        r#"
[database]
path = "/var/lib/measurements/data.db"
"#,
    )
    .unwrap();
    assert_eq!(
        config.database.path,
        PathBuf::from("/var/lib/measurements/data.db")
    );
    assert_eq!(config.database.pool_size, 4);
    assert_eq!(config.bench.amount, 1000);
}

#[test]
fn zero_pool_size_is_rejected() {
    let err = parse_config("[database]\npool_size = 0\n").unwrap_err();
    assert!(err.to_string().contains("pool_size"));
}

#[test]
fn empty_database_path_is_rejected() {
    assert!(parse_config("[database]\npath = \"\"\n").is_err());
}

#[test]
fn wrong_type_is_rejected() {
    assert!(parse_config("[bench]\namount = \"lots\"\n").is_err());
}

#[test]
fn load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("measurements.toml");
    fs::write(&path, "[bench]\namount = 250\n").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.bench.amount, 250);

    let same = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(same.bench.amount, 250);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn default_config_round_trips_through_toml() {
    let text = toml::to_string(&Config::default()).unwrap();
    let config = parse_config(&text).unwrap();
    assert_eq!(config.database.pool_size, 4);
}
