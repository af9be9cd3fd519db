//! feedsync core: incremental synchronization of per-entity time-series feeds.
//!
//! This crate contains the reconciliation engine and its collaborators:
//! - Domain types (records, datasets, feed descriptors)
//! - Date validation of fetched records
//! - Merge with date-key deduplication and chronological sort
//! - Dataset store with atomic CSV persistence and sync metadata
//! - Feed source trait with an HTTP implementation
//! - Reconciliation engine and sequential sync driver
//! - Structured sync events for injected logging

pub mod data;
pub mod domain;
