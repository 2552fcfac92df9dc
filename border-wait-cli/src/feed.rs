//! Feed-reading commands: `wait-times` and `ports`.

use border_wait_core::{RawCrossing, available_ports, summarise};
use border_wait_data::{
    DEFAULT_FEED_URL, DEFAULT_USER_AGENT, FeedSource, FileFeedSource, HttpFeedSource,
    fetch_crossings,
};
use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{ARG_FEED_FILE, ARG_FEED_URL, ARG_USER_AGENT, CliError, write_json};

/// CLI arguments for the `wait-times` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "wait-times",
    about = "Print every crossing of the feed in canonical form"
)]
#[ortho_config(prefix = "BORDER_WAIT")]
pub(crate) struct WaitTimesArgs {
    /// URL of the upstream feed.
    #[arg(long = ARG_FEED_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) feed_url: Option<String>,
    /// Read a saved feed snapshot instead of fetching over HTTP.
    #[arg(long = ARG_FEED_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) feed_file: Option<Utf8PathBuf>,
    /// User agent sent with feed requests.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

/// CLI arguments for the `ports` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "ports", about = "List the crossing names present in the feed")]
#[ortho_config(prefix = "BORDER_WAIT")]
pub(crate) struct PortsArgs {
    /// URL of the upstream feed.
    #[arg(long = ARG_FEED_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) feed_url: Option<String>,
    /// Read a saved feed snapshot instead of fetching over HTTP.
    #[arg(long = ARG_FEED_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) feed_file: Option<Utf8PathBuf>,
    /// User agent sent with feed requests.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FeedLocation {
    /// Fetch over HTTP.
    Url(String),
    /// Read a saved snapshot.
    File(Utf8PathBuf),
}

/// Resolved feed settings shared by every feed-reading command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedConfig {
    pub(crate) location: FeedLocation,
    pub(crate) user_agent: String,
}

impl FeedConfig {
    /// A snapshot file wins over a URL; with neither, the public feed is used.
    pub(crate) fn resolve(
        feed_url: Option<String>,
        feed_file: Option<Utf8PathBuf>,
        user_agent: Option<String>,
    ) -> Self {
        let location = match (feed_file, feed_url) {
            (Some(path), _) => FeedLocation::File(path),
            (None, Some(url)) => FeedLocation::Url(url),
            (None, None) => FeedLocation::Url(DEFAULT_FEED_URL.to_owned()),
        };
        Self {
            location,
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        }
    }

    fn open(&self) -> Result<Box<dyn FeedSource>, CliError> {
        match &self.location {
            FeedLocation::File(path) => Ok(Box::new(FileFeedSource::new(path.clone()))),
            FeedLocation::Url(url) => {
                let source = HttpFeedSource::new(url.clone())
                    .map_err(|source| CliError::BuildFeedClient {
                        url: url.clone(),
                        source,
                    })?
                    .with_user_agent(self.user_agent.clone());
                Ok(Box::new(source))
            }
        }
    }
}

/// Fetch and decode the configured feed on a single-threaded runtime.
pub(crate) fn fetch(config: &FeedConfig) -> Result<Vec<RawCrossing>, CliError> {
    let source = config.open()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let crossings = runtime.block_on(fetch_crossings(source.as_ref()))?;
    info!("fetched {} crossings from {}", crossings.len(), source.location());
    Ok(crossings)
}

impl WaitTimesArgs {
    fn into_config(self) -> Result<FeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(FeedConfig::from(merged))
    }
}

impl From<WaitTimesArgs> for FeedConfig {
    fn from(args: WaitTimesArgs) -> Self {
        Self::resolve(args.feed_url, args.feed_file, args.user_agent)
    }
}

impl PortsArgs {
    fn into_config(self) -> Result<FeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(FeedConfig::from(merged))
    }
}

impl From<PortsArgs> for FeedConfig {
    fn from(args: PortsArgs) -> Self {
        Self::resolve(args.feed_url, args.feed_file, args.user_agent)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PortsResponse {
    pub(crate) available_ports: Vec<String>,
}

pub(crate) fn run_wait_times_with(
    args: WaitTimesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let crossings = fetch(&config)?;
    let summary = summarise(&crossings)?;
    write_json(writer, &summary)
}

pub(crate) fn run_ports_with(args: PortsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let crossings = fetch(&config)?;
    write_json(
        writer,
        &PortsResponse {
            available_ports: available_ports(&crossings),
        },
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FeedConfig, CliError> {
    let merged = WaitTimesArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(FeedConfig::from(merged))
}
