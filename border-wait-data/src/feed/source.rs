use std::io;
use std::time::Duration;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use reqwest::Client;
use reqwest::header::USER_AGENT;

use super::TransportError;

/// Published location of the CBP border wait times feed.
pub const DEFAULT_FEED_URL: &str = "https://bwt.cbp.gov/xml/bwt.xml";

/// User agent sent with feed requests unless overridden.
pub const DEFAULT_USER_AGENT: &str = "border-wait/0.1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Somewhere the raw feed bytes can be fetched from.
#[async_trait(?Send)]
pub trait FeedSource {
    /// URL or path used in diagnostics.
    fn location(&self) -> &str;
    /// Fetch the complete feed payload.
    async fn fetch(&self) -> Result<Vec<u8>, TransportError>;
}

/// HTTP implementation of [`FeedSource`].
#[derive(Debug)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
    user_agent: String,
}

impl HttpFeedSource {
    /// Construct a source fetching `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when the HTTP client cannot be
    /// built, for example when no TLS backend is available.
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| TransportError::Client { source })?;
        Ok(Self {
            client,
            url: url.into(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait(?Send)]
impl FeedSource for HttpFeedSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, &self.url))?;
        Ok(body.to_vec())
    }
}

/// Reads a previously saved feed snapshot from disk.
///
/// The read is blocking; snapshots are small and only used for offline runs.
#[derive(Debug, Clone)]
pub struct FileFeedSource {
    path: Utf8PathBuf,
}

impl FileFeedSource {
    /// Construct a source reading `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot location.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait(?Send)]
impl FeedSource for FileFeedSource {
    fn location(&self) -> &str {
        self.path.as_str()
    }

    async fn fetch(&self) -> Result<Vec<u8>, TransportError> {
        border_wait_fs::read_file(&self.path).map_err(|source| TransportError::ReadFile {
            path: self.path.clone(),
            source,
        })
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
