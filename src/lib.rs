//! Measurements - sensor measurement store for experiments
//!
//! This library crate exposes the command-line configuration for
//! integration testing. Storage lives in `measurements-db`.

pub mod config;
