#![forbid(unsafe_code)]

use border_wait_core::{LaneMetricField, LaneSlot};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension};
use thiserror::Error;

/// Version of the history schema this build reads and writes.
pub const SCHEMA_VERSION: i64 = 1;

/// Name of the history table.
pub(crate) const HISTORY_TABLE: &str = "border_wait_history";

/// Identity, descriptive and temporal columns, in insert order.
pub(crate) const DETAIL_COLUMNS: [&str; 12] = [
    "port_code",
    "port_name",
    "crossing_name",
    "state",
    "region",
    "border",
    "hours",
    "notice",
    "note",
    "port_status",
    "date",
    "time",
];

/// Column holding one lane metric, e.g. `passenger_sentri_lanes_open`.
pub(crate) fn lane_column(slot: LaneSlot, metric: LaneMetricField) -> String {
    format!("{}_{}", slot.name(), metric.name())
}

/// Every lane column, slot-major, in insert order.
pub(crate) fn lane_columns() -> impl Iterator<Item = (LaneSlot, LaneMetricField, String)> {
    LaneSlot::ALL.into_iter().flat_map(|slot| {
        LaneMetricField::ALL
            .into_iter()
            .map(move |metric| (slot, metric, lane_column(slot, metric)))
    })
}

/// Initialise the history schema inside an existing SQLite database.
///
/// Creates the history table, the unique identity index and the schema
/// version table. Existing installations must already match
/// [`SCHEMA_VERSION`]; mismatches are rejected so migrations can be applied
/// explicitly.
///
/// # Errors
///
/// Returns [`HistorySchemaError`] when a migration step fails or the stored
/// version differs.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use border_wait_data::history::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create history schema");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM history_schema_version LIMIT 1", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, 1);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), HistorySchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| HistorySchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_history_table(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| HistorySchemaError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    Ok(())
}

fn create_history_table(transaction: &rusqlite::Transaction<'_>) -> Result<(), HistorySchemaError> {
    let lanes: String = lane_columns()
        .map(|(_, metric, column)| match metric {
            LaneMetricField::UpdateTime => format!(",\n            {column} TEXT"),
            LaneMetricField::DelayMinutes | LaneMetricField::LanesOpen => {
                format!(",\n            {column} INTEGER CHECK ({column} >= 0)")
            }
        })
        .collect();
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            port_code TEXT NOT NULL,
            port_name TEXT NOT NULL,
            crossing_name TEXT NOT NULL,
            state TEXT NOT NULL,
            region TEXT NOT NULL,
            border TEXT NOT NULL,
            hours TEXT NOT NULL,
            notice TEXT NOT NULL,
            note TEXT NOT NULL,
            port_status TEXT NOT NULL,
            date TEXT,
            time TEXT NOT NULL CHECK (length(time) > 0),
            stale INTEGER NOT NULL CHECK (stale IN (0, 1)){lanes},
            raw_payload TEXT NOT NULL,
            recorded_at INTEGER NOT NULL
        )"
    );
    run_migration_step(transaction, "create border_wait_history", &sql)
}

fn create_indexes(transaction: &rusqlite::Transaction<'_>) -> Result<(), HistorySchemaError> {
    // `date` is nullable; NULLs never collide in a plain unique index.
    run_migration_step(
        transaction,
        "index border_wait_history identity",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_border_wait_history_identity
            ON border_wait_history(port_code, ifnull(date, ''), time)",
    )
}

fn ensure_schema_version(
    transaction: &rusqlite::Transaction<'_>,
) -> Result<(), HistorySchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS history_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM history_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| HistorySchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(HistorySchemaError::VersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        None => {
            transaction
                .execute(
                    "INSERT INTO history_schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(|source| HistorySchemaError::Migration {
                    step: "record schema version",
                    source,
                })?;
        }
    }

    Ok(())
}

fn run_migration_step(
    transaction: &rusqlite::Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), HistorySchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| HistorySchemaError::Migration { step, source })
}

/// Errors raised when initialising the history schema.
#[derive(Debug, Error)]
pub enum HistorySchemaError {
    /// A migration statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Step description.
        step: &'static str,
        /// SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The database was created by a different schema version.
    #[error(
        "expected history schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}
