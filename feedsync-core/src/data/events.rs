//! Sync events and observers.
//!
//! The engine and driver never log directly. They hand every notable step to a
//! [`SyncObserver`]; [`TracingObserver`] turns those into `tracing` events and
//! [`RecordingObserver`] keeps them in memory.

use super::provider::ErrorKind;
use super::validate::DropCounts;
use std::sync::Mutex;

/// A notable step of a sync run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    EntityStarted {
        entity: String,
        index: usize,
        total: usize,
    },
    LocalLoaded {
        entity: String,
        feed: String,
        rows: usize,
    },
    RemoteTotal {
        entity: String,
        feed: String,
        total: usize,
    },
    /// Local rows exceed the remote total; a full refetch follows.
    CountAnomaly {
        entity: String,
        feed: String,
        local_rows: usize,
        remote_total: usize,
    },
    UpToDate {
        entity: String,
        feed: String,
        rows: usize,
    },
    Fetching {
        entity: String,
        feed: String,
        need: usize,
    },
    RecordsDropped {
        entity: String,
        feed: String,
        dropped: DropCounts,
    },
    NoValidRows {
        entity: String,
        feed: String,
        fetched: usize,
    },
    Saved {
        entity: String,
        feed: String,
        rows: usize,
        added: usize,
        replaced: usize,
    },
    Failed {
        entity: String,
        feed: String,
        kind: ErrorKind,
        message: String,
    },
    BatchComplete {
        pairs: usize,
        updated: usize,
        up_to_date: usize,
        no_valid_rows: usize,
        failed: usize,
    },
}

/// Receiver of sync events.
pub trait SyncObserver: Send + Sync {
    fn record(&self, event: &SyncEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn record(&self, event: &SyncEvent) {
        match event {
            SyncEvent::EntityStarted {
                entity,
                index,
                total,
            } => {
                tracing::info!(%entity, "=== [{}/{}] processing {} ===", index + 1, total, entity);
            }
            SyncEvent::LocalLoaded { entity, feed, rows } => {
                tracing::info!(%entity, %feed, rows, "existing rows loaded");
            }
            SyncEvent::RemoteTotal {
                entity,
                feed,
                total,
            } => {
                tracing::info!(%entity, %feed, total, "remote total count");
            }
            SyncEvent::CountAnomaly {
                entity,
                feed,
                local_rows,
                remote_total,
            } => {
                tracing::warn!(
                    %entity,
                    %feed,
                    local_rows,
                    remote_total,
                    "local rows exceed remote total, refetching all rows"
                );
            }
            SyncEvent::UpToDate { entity, feed, rows } => {
                tracing::info!(%entity, %feed, rows, "already up to date");
            }
            SyncEvent::Fetching { entity, feed, need } => {
                tracing::info!(%entity, %feed, need, "fetching new rows");
            }
            SyncEvent::RecordsDropped {
                entity,
                feed,
                dropped,
            } => {
                tracing::debug!(
                    %entity,
                    %feed,
                    missing = dropped.missing,
                    sentinel = dropped.sentinel,
                    unparsable = dropped.unparsable,
                    implausible = dropped.implausible,
                    "dropped records with invalid dates"
                );
            }
            SyncEvent::NoValidRows {
                entity,
                feed,
                fetched,
            } => {
                tracing::info!(%entity, %feed, fetched, "no valid records after date cleaning");
            }
            SyncEvent::Saved {
                entity,
                feed,
                rows,
                added,
                replaced,
            } => {
                tracing::info!(%entity, %feed, rows, added, replaced, "dataset saved");
            }
            SyncEvent::Failed {
                entity,
                feed,
                kind,
                message,
            } => {
                tracing::error!(%entity, %feed, ?kind, "reconciliation failed: {message}");
            }
            SyncEvent::BatchComplete {
                pairs,
                updated,
                up_to_date,
                no_valid_rows,
                failed,
            } => {
                tracing::info!(
                    pairs,
                    updated,
                    up_to_date,
                    no_valid_rows,
                    failed,
                    "sync complete"
                );
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl SyncObserver for RecordingObserver {
    fn record(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
