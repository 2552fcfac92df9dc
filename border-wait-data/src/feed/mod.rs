//! Retrieval and decoding of the upstream border wait feed.
//!
//! A [`FeedSource`] yields raw bytes; [`decode_feed`] turns them into one
//! [`RawCrossing`](border_wait_core::RawCrossing) per port, whichever wire
//! format the feed currently publishes.
#![forbid(unsafe_code)]

mod decode;
mod error;
mod ops;
mod source;
mod xml;

#[cfg(any(test, doc))]
mod test_support;
#[cfg(any(test, doc))]
pub use test_support::{StubFeedSource, block_on_for_tests};

pub use decode::{FeedFormat, decode_feed};
pub use error::{FeedDecodeError, FeedError, TransportError};
pub use ops::fetch_crossings;
pub use source::{DEFAULT_FEED_URL, DEFAULT_USER_AGENT, FeedSource, FileFeedSource, HttpFeedSource};

#[cfg(test)]
mod tests;
