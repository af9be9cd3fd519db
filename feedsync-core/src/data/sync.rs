//! Sync driver. Walks entities and feeds, reconciling one pair at a time.
//!
//! Pairs are processed sequentially to completion. A failure is recorded and the
//! driver moves on; it never stops the batch. A parallel driver would need
//! per-(entity, feed) mutual exclusion around load/merge/save.

use super::events::{SyncEvent, SyncObserver};
use super::provider::{FeedSource, SyncError};
use super::reconcile::{Outcome, ReconciliationEngine};
use super::store::DatasetStore;
use crate::domain::FeedSpec;

/// Settings the driver passes to every reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Page size of the metadata probe.
    pub page_size_hint: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { page_size_hint: 20 }
    }
}

/// A failed (entity, feed) pair.
#[derive(Debug)]
pub struct PairFailure {
    pub entity: String,
    pub feed: String,
    pub error: SyncError,
}

/// Summary of a batch sync.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub pairs: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub no_valid_rows: usize,
    pub failed: usize,
    pub failures: Vec<PairFailure>,
}

impl SyncSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    fn count(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::UpToDate { .. } => self.up_to_date += 1,
            Outcome::NoValidRows { .. } => self.no_valid_rows += 1,
            Outcome::Updated(_) => self.updated += 1,
        }
    }
}

/// Drives reconciliation across a list of entities and feeds.
pub struct SyncDriver<'a> {
    engine: ReconciliationEngine<'a>,
    observer: &'a dyn SyncObserver,
    options: SyncOptions,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        options: SyncOptions,
        source: &'a dyn FeedSource,
        store: &'a dyn DatasetStore,
        observer: &'a dyn SyncObserver,
    ) -> Self {
        Self {
            engine: ReconciliationEngine::new(source, store, observer),
            observer,
            options,
        }
    }

    /// Reconcile a single pair, recording a failure event on error.
    pub fn sync_pair(&self, entity: &str, feed: &FeedSpec) -> Result<Outcome, SyncError> {
        let result = self
            .engine
            .reconcile(entity, feed, self.options.page_size_hint);
        if let Err(e) = &result {
            self.observer.record(&SyncEvent::Failed {
                entity: entity.to_string(),
                feed: feed.name.clone(),
                kind: e.kind(),
                message: e.to_string(),
            });
        }
        result
    }

    /// Reconcile every feed of every entity, in order.
    pub fn run(&self, entities: &[String], feeds: &[FeedSpec]) -> SyncSummary {
        let mut summary = SyncSummary::default();
        let total = entities.len();

        for (i, entity) in entities.iter().enumerate() {
            self.observer.record(&SyncEvent::EntityStarted {
                entity: entity.clone(),
                index: i,
                total,
            });

            for feed in feeds {
                summary.pairs += 1;
                match self.sync_pair(entity, feed) {
                    Ok(outcome) => summary.count(&outcome),
                    Err(error) => {
                        summary.failed += 1;
                        summary.failures.push(PairFailure {
                            entity: entity.clone(),
                            feed: feed.name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        self.observer.record(&SyncEvent::BatchComplete {
            pairs: summary.pairs,
            updated: summary.updated,
            up_to_date: summary.up_to_date,
            no_valid_rows: summary.no_valid_rows,
            failed: summary.failed,
        });

        summary
    }
}
