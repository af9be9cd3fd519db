//! Incremental reconciliation of one (entity, feed) dataset.
//!
//! Compares the local row count with the remote total, fetches exactly the
//! missing rows, validates them and merges them into the persisted dataset.
//!
//! External invariant: the remote serves rows most-recent-first and never
//! backfills or corrects history out of recency order. Under that assumption the
//! first `total - local` rows of page one are exactly the rows missing locally.
//! Nothing here can verify it; a remote that inserts older rows will leave gaps
//! that only a full refetch (local count above remote total) repairs.

use super::events::{SyncEvent, SyncObserver};
use super::merge::merge;
use super::provider::{FeedSource, SyncError};
use super::store::DatasetStore;
use super::validate::{validate_records, DropCounts};
use crate::domain::{Dataset, FeedSpec};

/// What a reconciliation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to fetch; the dataset was not touched.
    UpToDate { local_rows: usize, remote_total: usize },
    /// Rows were fetched but none had a valid date; the dataset was not touched.
    NoValidRows {
        requested: usize,
        fetched: usize,
        dropped: DropCounts,
    },
    /// New rows were merged and the dataset saved.
    Updated(UpdateReport),
}

/// Details of a successful merge-and-save.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub previous_rows: usize,
    pub remote_total: usize,
    pub requested: usize,
    pub fetched: usize,
    pub dropped: DropCounts,
    pub replaced: usize,
    pub final_rows: usize,
    pub full_refetch: bool,
}

/// Fetch plan derived from local and remote counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub need: usize,
    /// Local count exceeded the remote total: everything is refetched and the
    /// fetched rows replace the local dataset.
    pub full_refetch: bool,
}

/// Decide how many rows to request.
///
/// A local count above the remote total is treated as zero local rows.
pub fn plan_fetch(local_rows: usize, remote_total: usize) -> FetchPlan {
    if local_rows > remote_total {
        FetchPlan {
            need: remote_total,
            full_refetch: true,
        }
    } else {
        FetchPlan {
            need: remote_total - local_rows,
            full_refetch: false,
        }
    }
}

/// Reconciles datasets against a feed source.
pub struct ReconciliationEngine<'a> {
    source: &'a dyn FeedSource,
    store: &'a dyn DatasetStore,
    observer: &'a dyn SyncObserver,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(
        source: &'a dyn FeedSource,
        store: &'a dyn DatasetStore,
        observer: &'a dyn SyncObserver,
    ) -> Self {
        Self {
            source,
            store,
            observer,
        }
    }

    /// Bring the dataset for `entity`/`feed` up to date.
    ///
    /// `page_size_hint` sizes the metadata probe. Any error leaves the persisted
    /// dataset exactly as it was.
    pub fn reconcile(
        &self,
        entity: &str,
        feed: &FeedSpec,
        page_size_hint: usize,
    ) -> Result<Outcome, SyncError> {
        let event = |e: SyncEvent| self.observer.record(&e);

        let existing = self.store.load(entity, feed)?;
        let local_rows = existing.len();
        event(SyncEvent::LocalLoaded {
            entity: entity.to_string(),
            feed: feed.name.clone(),
            rows: local_rows,
        });

        let probe = self
            .source
            .fetch_page(entity, feed, page_size_hint.max(1))?;
        let remote_total = probe.total_count;
        event(SyncEvent::RemoteTotal {
            entity: entity.to_string(),
            feed: feed.name.clone(),
            total: remote_total,
        });

        let plan = plan_fetch(local_rows, remote_total);
        if plan.full_refetch {
            event(SyncEvent::CountAnomaly {
                entity: entity.to_string(),
                feed: feed.name.clone(),
                local_rows,
                remote_total,
            });
        }

        if plan.need == 0 {
            event(SyncEvent::UpToDate {
                entity: entity.to_string(),
                feed: feed.name.clone(),
                rows: local_rows,
            });
            return Ok(Outcome::UpToDate {
                local_rows,
                remote_total,
            });
        }

        event(SyncEvent::Fetching {
            entity: entity.to_string(),
            feed: feed.name.clone(),
            need: plan.need,
        });
        let page = self.source.fetch_page(entity, feed, plan.need)?;
        let fetched = page.rows.len();

        let validated = validate_records(page.rows, &feed.date_field);
        if validated.dropped.total() > 0 {
            event(SyncEvent::RecordsDropped {
                entity: entity.to_string(),
                feed: feed.name.clone(),
                dropped: validated.dropped,
            });
        }
        if validated.records.is_empty() {
            event(SyncEvent::NoValidRows {
                entity: entity.to_string(),
                feed: feed.name.clone(),
                fetched,
            });
            return Ok(Outcome::NoValidRows {
                requested: plan.need,
                fetched,
                dropped: validated.dropped,
            });
        }

        // A full refetch replaces the stale rows; only the header order carries over.
        let base = if plan.full_refetch {
            Dataset::from_parts(existing.columns().to_vec(), Vec::new())
        } else {
            existing
        };
        let merged = merge(base, validated.records, &feed.date_field);
        self.store.save(entity, feed, &merged.dataset)?;

        let final_rows = merged.dataset.len();
        event(SyncEvent::Saved {
            entity: entity.to_string(),
            feed: feed.name.clone(),
            rows: final_rows,
            added: final_rows.saturating_sub(local_rows),
            replaced: merged.replaced,
        });

        Ok(Outcome::Updated(UpdateReport {
            previous_rows: local_rows,
            remote_total,
            requested: plan.need,
            fetched,
            dropped: validated.dropped,
            replaced: merged.replaced,
            final_rows,
            full_refetch: plan.full_refetch,
        }))
    }
}
