//! Shared fixtures for feed tests.
use std::future::Future;

use async_trait::async_trait;

use super::{FeedSource, TransportError};

/// Stub [`FeedSource`] returning canned bytes or a canned failure.
#[derive(Debug, Clone)]
pub struct StubFeedSource {
    payload: Result<Vec<u8>, u16>,
}

impl StubFeedSource {
    /// Source that always returns `payload`.
    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Ok(payload.into()),
        }
    }

    /// Source that always fails with HTTP `status`.
    pub fn with_status(status: u16) -> Self {
        Self {
            payload: Err(status),
        }
    }
}

#[async_trait(?Send)]
impl FeedSource for StubFeedSource {
    fn location(&self) -> &str {
        "stub://feed"
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        self.payload
            .clone()
            .map_err(|status| TransportError::Http {
                url: self.location().to_owned(),
                status,
                message: "stubbed failure".to_owned(),
            })
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime")
        .block_on(future)
}
