//! Command-line interface for the border wait engine.
//!
//! Each subcommand fetches the upstream feed (or a saved snapshot), runs it
//! through the normalisation pipeline and writes JSON to stdout.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

mod error;
mod feed;
mod history;
mod record;

pub use error::CliError;

use feed::{PortsArgs, WaitTimesArgs};
use history::HistoryArgs;
use record::RecordArgs;

pub(crate) const ARG_FEED_URL: &str = "feed-url";
pub(crate) const ARG_FEED_FILE: &str = "feed-file";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_HISTORY_DB: &str = "history-db";
pub(crate) const ARG_PORT_CODE: &str = "port-code";
pub(crate) const ENV_HISTORY_PORT_CODE: &str = "BORDER_WAIT_CMDS_HISTORY_PORT_CODE";

/// History database used when none is configured.
pub const DEFAULT_HISTORY_DB: &str = "border_wait_history.db";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// feed cannot be fetched, the history store fails, or a recording pass
/// leaves crossings unrecorded.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::WaitTimes(args) => feed::run_wait_times_with(args, writer),
        Command::Ports(args) => feed::run_ports_with(args, writer),
        Command::Record(args) => record::run_record_with(args, writer),
        Command::History(args) => history::run_history_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "border-wait",
    about = "Normalise and record border crossing wait times",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every crossing in canonical form.
    WaitTimes(WaitTimesArgs),
    /// List the crossing names present in the feed.
    Ports(PortsArgs),
    /// Record one pass of the feed into the history database.
    Record(RecordArgs),
    /// Print the recorded history of one port.
    History(HistoryArgs),
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
