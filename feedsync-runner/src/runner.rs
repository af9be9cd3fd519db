//! Sync runner: wires configuration, feed source, store and observer together.
//!
//! Two entry points:
//! - `run_sync()`: builds the HTTP source and CSV store from a `SyncConfig`. Used by the CLI.
//! - `run_sync_with()`: takes an explicit source and observer. Used by tests and
//!   embedding callers.

use feedsync_core::data::{
    CsvStore, DatasetStatus, FeedSource, HttpFeedSource, SyncDriver, SyncError, SyncObserver,
    SyncOptions, SyncSummary, TracingObserver,
};
use feedsync_core::domain::FeedSpec;
use thiserror::Error;

use crate::config::{ConfigError, SyncConfig};
use crate::universe::UniverseError;

/// Errors that stop a run before any pair is reconciled.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),
    #[error("feed source setup failed: {0}")]
    Source(#[from] SyncError),
    #[error("no entities to sync")]
    NoEntities,
}

/// Store rooted at the configured dataset directory.
pub fn open_store(config: &SyncConfig) -> CsvStore {
    CsvStore::new(&config.dataset_root)
}

/// Sync every (entity, feed) pair over HTTP, logging through `tracing`.
pub fn run_sync(
    config: &SyncConfig,
    entities: &[String],
    feeds: &[FeedSpec],
) -> Result<SyncSummary, RunError> {
    if entities.is_empty() {
        return Err(RunError::NoEntities);
    }
    let source = HttpFeedSource::new(&config.http.to_options())?;
    Ok(run_sync_with(config, &source, &TracingObserver, entities, feeds))
}

/// Sync with an explicit source and observer. Per-pair failures land in the summary.
pub fn run_sync_with(
    config: &SyncConfig,
    source: &dyn FeedSource,
    observer: &dyn SyncObserver,
    entities: &[String],
    feeds: &[FeedSpec],
) -> SyncSummary {
    let store = open_store(config);
    let options = SyncOptions {
        page_size_hint: config.page_size_hint,
    };

    tracing::info!(
        source = source.name(),
        root = %store.root().display(),
        entities = entities.len(),
        feeds = feeds.len(),
        "starting sync"
    );

    SyncDriver::new(options, source, &store, observer).run(entities, feeds)
}

/// Status of every (entity, feed) dataset under the configured root.
pub fn dataset_status(
    config: &SyncConfig,
    entities: &[String],
    feeds: &[FeedSpec],
) -> Vec<DatasetStatus> {
    open_store(config).status(entities, feeds)
}
