//! Facade crate for the border wait engine.
//!
//! This crate re-exports the normalisation pipeline and recorder, and exposes
//! the feed transport and SQLite history store behind the `store-sqlite`
//! feature flag.

#![forbid(unsafe_code)]

pub use border_wait_core::{
    CanonicalCrossing, HistoricalEntry, HistoryStore, IdentityKey, LaneMetric, PassReport,
    RawCrossing, RecordOutcome, Recorder, WaitTimesSummary, available_ports, canonicalise,
    normalize, prepare_entry, record_pass, summarise,
};

#[cfg(feature = "store-sqlite")]
pub use border_wait_data::{
    FeedError, FeedSource, FileFeedSource, HistoryStoreError, HttpFeedSource,
    SqliteHistoryStore, fetch_crossings,
};
