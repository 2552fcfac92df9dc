//! Error types emitted by the border wait CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use border_wait_core::LaneTreeError;
use border_wait_data::{FeedError, HistoryStoreError, TransportError};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the border wait CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The HTTP client for the feed could not be built.
    #[error("failed to prepare feed client for {url}: {source}")]
    BuildFeedClient {
        /// Configured feed URL.
        url: String,
        /// Transport error.
        #[source]
        source: TransportError,
    },
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Fetching or decoding the feed failed.
    #[error(transparent)]
    Feed(#[from] Box<FeedError>),
    /// A crossing could not be canonicalised.
    #[error("failed to canonicalise feed: {0}")]
    Canonicalise(#[from] LaneTreeError),
    /// Opening or querying the history database failed.
    #[error("history database {path} failed: {source}")]
    History {
        /// Database path.
        path: Utf8PathBuf,
        /// Store error.
        #[source]
        source: HistoryStoreError,
    },
    /// Some crossings of a recording pass were not recorded.
    #[error("{failed} of {total} crossings could not be recorded")]
    IncompletePass {
        /// Crossings that failed.
        failed: usize,
        /// Crossings in the pass.
        total: usize,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<FeedError> for CliError {
    fn from(err: FeedError) -> Self {
        Self::Feed(Box::new(err))
    }
}
