//! The `history` command: print recorded entries for one port.

use border_wait_data::SqliteHistoryStore;
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_HISTORY_DB, ARG_PORT_CODE, CliError, DEFAULT_HISTORY_DB, ENV_HISTORY_PORT_CODE,
    write_json,
};

/// CLI arguments for the `history` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "history", about = "Print the recorded history of one port")]
#[ortho_config(prefix = "BORDER_WAIT")]
pub(crate) struct HistoryArgs {
    /// Port code, e.g. `250401`.
    #[arg(value_name = ARG_PORT_CODE)]
    #[serde(default)]
    pub(crate) port_code: Option<String>,
    /// SQLite history database (`border_wait_history.db` by default).
    #[arg(long = ARG_HISTORY_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) history_db: Option<Utf8PathBuf>,
}

impl HistoryArgs {
    fn into_config(self) -> Result<HistoryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HistoryConfig::try_from(merged)
    }
}

/// Resolved `history` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryConfig {
    pub(crate) port_code: String,
    pub(crate) history_db: Utf8PathBuf,
}

impl TryFrom<HistoryArgs> for HistoryConfig {
    type Error = CliError;

    fn try_from(args: HistoryArgs) -> Result<Self, Self::Error> {
        let port_code = args
            .port_code
            .filter(|code| !code.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_PORT_CODE,
                env: ENV_HISTORY_PORT_CODE,
            })?;
        Ok(Self {
            port_code,
            history_db: args
                .history_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_HISTORY_DB)),
        })
    }
}

pub(crate) fn run_history_with(args: HistoryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let history_error = |source| CliError::History {
        path: config.history_db.clone(),
        source,
    };
    let store = SqliteHistoryStore::open(&config.history_db).map_err(history_error)?;
    let entries = store
        .entries_for_port(&config.port_code)
        .map_err(history_error)?;
    write_json(writer, &entries)
}
