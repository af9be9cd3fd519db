//! Domain types for feedsync

pub mod dataset;
pub mod feed;
pub mod record;

pub use dataset::Dataset;
pub use feed::FeedSpec;
pub use record::{cell_text, Record};
