//! Feed source trait and structured error types.
//!
//! The FeedSource trait abstracts over where pages come from (the HTTP endpoint,
//! a scripted source in tests) so the reconciliation engine never touches the
//! transport directly.

use crate::domain::{FeedSpec, Record};
use thiserror::Error;

/// Errors that abort reconciliation of a single (entity, feed) pair.
///
/// These are designed to be displayable in both log and CLI contexts.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("unexpected response shape: {0}")]
    Schema(String),

    #[error("dataset store error: {0}")]
    Store(String),
}

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Schema,
    Store,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Transport(_) | SyncError::HttpStatus { .. } => ErrorKind::Transport,
            SyncError::Schema(_) => ErrorKind::Schema,
            SyncError::Store(_) => ErrorKind::Store,
        }
    }
}

/// One page of a feed: the remote's total row count plus the rows returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub total_count: usize,
    pub rows: Vec<Record>,
}

/// Trait for remote feed sources.
///
/// Pages always start at the first page. Sources are expected to return rows
/// ordered most-recent-first, so a page of size N holds the N newest rows.
pub trait FeedSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the first page of `feed` for `entity`, holding at most `page_size` rows.
    fn fetch_page(&self, entity: &str, feed: &FeedSpec, page_size: usize)
        -> Result<Page, SyncError>;
}
