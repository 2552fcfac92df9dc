//! Error types produced while fetching and decoding the feed.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Transport-level errors encountered while retrieving feed bytes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Builder error reported by `reqwest`.
        source: reqwest::Error,
    },
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description supplied by the server.
        message: String,
    },
    /// The request failed due to an I/O error.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// A saved snapshot could not be read.
    #[error("failed to read feed snapshot {path}: {source}")]
    ReadFile {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Errors raised while decoding feed bytes into crossing trees.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedDecodeError {
    /// The payload was empty or only whitespace.
    #[error("feed payload is empty")]
    Empty,
    /// The payload was not valid UTF-8.
    #[error("feed payload is not UTF-8: {source}")]
    Utf8 {
        /// Decoding error.
        source: std::str::Utf8Error,
    },
    /// The XML document could not be parsed.
    #[error("failed to parse XML feed: {source}")]
    Xml {
        /// Parser error.
        source: roxmltree::Error,
    },
    /// The JSON document could not be parsed.
    #[error("failed to parse JSON feed: {source}")]
    Json {
        /// Parser error.
        source: serde_json::Error,
    },
    /// The document carried no recognisable list of ports.
    #[error("feed document does not contain a port list")]
    MissingPorts,
    /// A port entry was not a mapping.
    #[error("port entry {index} is {found}, expected a mapping")]
    InvalidPort {
        /// Position of the entry in feed order.
        index: usize,
        /// JSON type found instead.
        found: &'static str,
    },
}

/// Failure of a whole fetch: no crossings are available to normalise.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Retrieving the feed failed.
    #[error("failed to fetch feed: {source}")]
    Fetch {
        /// Transport error.
        #[source]
        source: TransportError,
    },
    /// Decoding the feed failed.
    #[error("failed to decode feed from {location}: {source}")]
    Decode {
        /// URL or path the bytes came from.
        location: String,
        /// Decoding error.
        #[source]
        source: FeedDecodeError,
    },
}
