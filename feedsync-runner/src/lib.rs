//! feedsync runner: configuration, entity universe, logging and run wiring.
//!
//! This crate builds on `feedsync-core` to provide:
//! - TOML configuration with defaults and validation
//! - Entity resolution from the command line, a universe CSV or the config
//! - `tracing` subscriber setup (console plus append-only log file)
//! - Sync entry points that assemble source, store, observer and driver

pub mod config;
pub mod logging;
pub mod runner;
pub mod universe;

pub use config::{ConfigError, HttpConfig, LogConfig, SyncConfig, UniverseConfig};
pub use logging::init_logging;
pub use runner::{dataset_status, open_store, run_sync, run_sync_with, RunError};
pub use universe::{dedup_entities, load_entities, resolve_entities, UniverseError};
