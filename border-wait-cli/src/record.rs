//! The `record` command: one deduplicated recording pass.

use border_wait_core::record_pass;
use border_wait_data::SqliteHistoryStore;
use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::feed::{FeedConfig, fetch};
use crate::{
    ARG_FEED_FILE, ARG_FEED_URL, ARG_HISTORY_DB, ARG_USER_AGENT, CliError, DEFAULT_HISTORY_DB,
    write_json,
};

/// CLI arguments for the `record` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "record",
    long_about = "Fetch the feed once and store every crossing whose \
                 (port, date, time) report is not yet in the history \
                 database. Safe to run on a schedule from several hosts \
                 sharing one database file.",
    about = "Record one pass of the feed into the history database"
)]
#[ortho_config(prefix = "BORDER_WAIT")]
pub(crate) struct RecordArgs {
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
    /// SQLite history database (`border_wait_history.db` by default).
    #[arg(long = ARG_HISTORY_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) history_db: Option<Utf8PathBuf>,
}

impl RecordArgs {
    fn into_config(self) -> Result<RecordConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(RecordConfig::from(merged))
    }
}

/// Resolved `record` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordConfig {
    pub(crate) feed: FeedConfig,
    pub(crate) history_db: Utf8PathBuf,
}

impl From<RecordArgs> for RecordConfig {
    fn from(args: RecordArgs) -> Self {
        Self {
            feed: FeedConfig::resolve(args.feed_url, args.feed_file, args.user_agent),
            history_db: args
                .history_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_HISTORY_DB)),
        }
    }
}

/// Counts printed after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordSummary {
    pub(crate) inserted: usize,
    pub(crate) skipped: usize,
}

pub(crate) fn run_record_with(args: RecordArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let crossings = fetch(&config.feed)?;
    let mut store =
        SqliteHistoryStore::open(&config.history_db).map_err(|source| CliError::History {
            path: config.history_db.clone(),
            source,
        })?;

    let report = record_pass(&mut store, &crossings);
    info!(
        "recorded {} new entries into {} ({} already present)",
        report.inserted, config.history_db, report.skipped
    );
    write_json(
        writer,
        &RecordSummary {
            inserted: report.inserted,
            skipped: report.skipped,
        },
    )?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::IncompletePass {
            failed: report.failures.len(),
            total: crossings.len(),
        })
    }
}
