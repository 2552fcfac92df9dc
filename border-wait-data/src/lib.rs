//! Feed transport and history persistence for the border wait engine.
//!
//! Responsibilities:
//! - Fetch the upstream feed over HTTP or from a saved snapshot ([`feed`]).
//! - Decode XML and JSON revisions into raw crossing trees.
//! - Persist deduplicated history in SQLite ([`history`]).
//!
//! Boundaries:
//! - Do not encode normalisation rules (live in `border-wait-core`).
//! - Keep the store behind `border_wait_core::HistoryStore` so the recorder
//!   never owns a connection.
//!
//! Invariants:
//! - At most one history row per identity key, enforced by a unique index.
//! - No global mutable state.

pub mod feed;
pub mod history;

pub use feed::{
    DEFAULT_FEED_URL, DEFAULT_USER_AGENT, FeedDecodeError, FeedError, FeedFormat, FeedSource,
    FileFeedSource, HttpFeedSource, TransportError, decode_feed, fetch_crossings,
};
pub use history::{HistorySchemaError, HistoryStoreError, SqliteHistoryStore};
