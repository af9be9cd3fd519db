//! Feed fetching, validation, merging, persistence and reconciliation

pub mod events;
pub mod http;
pub mod merge;
pub mod provider;
pub mod reconcile;
pub mod store;
pub mod sync;
pub mod validate;

pub use events::{RecordingObserver, SyncEvent, SyncObserver, TracingObserver};
pub use http::{HttpFeedSource, HttpOptions};
pub use merge::{merge, Merged};
pub use provider::{ErrorKind, FeedSource, Page, SyncError};
pub use reconcile::{plan_fetch, FetchPlan, Outcome, ReconciliationEngine, UpdateReport};
pub use store::{CsvStore, DatasetStatus, DatasetStore, SyncMeta};
pub use sync::{PairFailure, SyncDriver, SyncOptions, SyncSummary};
pub use validate::{validate_records, DropCounts, DropReason, Validated, DATE_FORMAT};
