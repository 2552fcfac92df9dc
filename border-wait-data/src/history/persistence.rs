#![forbid(unsafe_code)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use border_wait_core::{
    CanonicalCrossing, CrossingDetails, FlatCrossing, HistoricalEntry, HistoryStore,
    IdentityKey, LaneMetric, LaneMetricField, LaneSlot, LaneTreeError, RawCrossing, build_tree,
};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row, params_from_iter};
use serde_json::Value;
use thiserror::Error;

use super::schema::{
    DETAIL_COLUMNS, HISTORY_TABLE, HistorySchemaError, initialise_schema, lane_columns,
};

/// How long a writer waits for a concurrent recorder to release the database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Position of the first lane column in the shared column list.
const FIRST_LANE_COLUMN: usize = DETAIL_COLUMNS.len() + 1;

/// SQLite-backed history of recorded crossings.
///
/// Uniqueness of the identity key is enforced by the database, so several
/// recorders can share one file without producing duplicate rows.
///
/// # Examples
/// ```
/// use border_wait_core::{HistoryStore, prepare_entry};
/// use border_wait_data::SqliteHistoryStore;
/// use serde_json::json;
///
/// let mut store = SqliteHistoryStore::open_in_memory()?;
/// let raw = json!({"port_number": "250401", "date": "10/19/2026", "time": "14:30"});
/// let entry = prepare_entry(raw.as_object().expect("object")).expect("canonical entry");
///
/// assert!(store.insert_if_absent(&entry)?);
/// assert!(!store.insert_if_absent(&entry)?);
/// assert_eq!(store.count_entries()?, 1);
/// # Ok::<(), border_wait_data::HistoryStoreError>(())
/// ```
#[derive(Debug)]
pub struct SqliteHistoryStore {
    connection: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) the history database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError`] when the parent directory cannot be
    /// created, the file cannot be opened, or the schema is incompatible.
    pub fn open(path: &Utf8Path) -> Result<Self, HistoryStoreError> {
        border_wait_fs::ensure_parent_dir(path).map_err(|source| HistoryStoreError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| HistoryStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("opened history database {path}");
        Self::from_connection(connection)
    }

    /// Open a private in-memory history, mostly useful in tests.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, HistoryStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| HistoryStoreError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, HistoryStoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "configure busy timeout",
                source,
            })?;
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError::Sqlite`] when the count query fails.
    pub fn count_entries(&self) -> Result<u64, HistoryStoreError> {
        let count: i64 = self
            .connection
            .query_row(&format!("SELECT COUNT(*) FROM {HISTORY_TABLE}"), [], |row| {
                row.get(0)
            })
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "count history entries",
                source,
            })?;
        // COUNT(*) is never negative.
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Every stored entry for `port_code`, in the order it was recorded.
    ///
    /// Feed dates and times are display text, so rows are ordered by
    /// `recorded_at` and then by row id.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError`] when the query fails or a stored row
    /// cannot be rebuilt into a canonical record.
    pub fn entries_for_port(
        &self,
        port_code: &str,
    ) -> Result<Vec<CanonicalCrossing>, HistoryStoreError> {
        let sql = format!(
            "SELECT {} FROM {HISTORY_TABLE}
             WHERE port_code = ?1
             ORDER BY recorded_at, id",
            stored_columns().join(", ")
        );
        let mut statement =
            self.connection
                .prepare_cached(&sql)
                .map_err(|source| HistoryStoreError::Sqlite {
                    operation: "prepare history lookup",
                    source,
                })?;
        let rows = statement
            .query_map([port_code], StoredRow::from_row)
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "query history",
                source,
            })?;

        let mut entries = Vec::new();
        for row in rows {
            let stored = row.map_err(|source| HistoryStoreError::Sqlite {
                operation: "read history row",
                source,
            })?;
            entries.push(stored.into_crossing()?);
        }
        Ok(entries)
    }
}

impl HistoryStore for SqliteHistoryStore {
    type Error = HistoryStoreError;

    fn contains(&self, key: &IdentityKey) -> Result<bool, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT 1 FROM border_wait_history
                 WHERE port_code = ?1 AND ifnull(date, '') = ifnull(?2, '') AND time = ?3
                 LIMIT 1",
            )
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "prepare identity lookup",
                source,
            })?;
        let found = statement
            .query_row(
                (key.port_code.as_str(), key.date.as_deref(), key.time.as_str()),
                |_| Ok(()),
            )
            .optional()
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "look up identity key",
                source,
            })?;
        Ok(found.is_some())
    }

    fn insert_if_absent(&mut self, entry: &HistoricalEntry) -> Result<bool, Self::Error> {
        let values = insert_values(entry)?;
        let columns = stored_columns();
        let placeholders: Vec<String> = (1..=columns.len() + 1)
            .map(|index| format!("?{index}"))
            .collect();
        let sql = format!(
            "INSERT OR IGNORE INTO {HISTORY_TABLE} ({}, recorded_at) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        let mut statement =
            self.connection
                .prepare_cached(&sql)
                .map_err(|source| HistoryStoreError::Sqlite {
                    operation: "prepare history insert",
                    source,
                })?;
        let changed = statement
            .execute(params_from_iter(values.iter()))
            .map_err(|source| HistoryStoreError::Sqlite {
                operation: "insert history entry",
                source,
            })?;
        Ok(changed == 1)
    }
}

/// Columns read and written for each entry, excluding `id` and `recorded_at`.
fn stored_columns() -> Vec<String> {
    DETAIL_COLUMNS
        .iter()
        .map(|column| (*column).to_owned())
        .chain(std::iter::once("stale".to_owned()))
        .chain(lane_columns().map(|(_, _, column)| column))
        .chain(std::iter::once("raw_payload".to_owned()))
        .collect()
}

fn insert_values(entry: &HistoricalEntry) -> Result<Vec<SqlValue>, HistoryStoreError> {
    let crossing = entry.crossing();
    let key = entry.key();
    let details = &crossing.details;

    let mut values: Vec<SqlValue> = [
        &key.port_code,
        &details.port_name,
        &details.crossing_name,
        &details.state,
        &details.region,
        &details.border,
        &details.hours,
        &details.notice,
        &details.note,
        &details.port_status,
    ]
    .into_iter()
    .map(|text| SqlValue::Text(text.clone()))
    .collect();
    values.push(optional_text(key.date.as_deref()));
    values.push(SqlValue::Text(key.time.clone()));
    values.push(SqlValue::Integer(i64::from(crossing.stale)));

    for (slot, metric, _) in lane_columns() {
        let lane = crossing.lane(slot);
        values.push(match metric {
            LaneMetricField::DelayMinutes => optional_count(lane.delay_minutes),
            LaneMetricField::LanesOpen => optional_count(lane.lanes_open),
            LaneMetricField::UpdateTime => optional_text(lane.update_time.as_deref()),
        });
    }

    let payload = serde_json::to_string(&crossing.raw_payload)
        .map_err(|source| HistoryStoreError::Payload { source })?;
    values.push(SqlValue::Text(payload));
    values.push(SqlValue::Integer(recorded_at()?));
    Ok(values)
}

fn optional_text(text: Option<&str>) -> SqlValue {
    text.map_or(SqlValue::Null, |value| SqlValue::Text(value.to_owned()))
}

fn optional_count(count: Option<u32>) -> SqlValue {
    count.map_or(SqlValue::Null, |value| SqlValue::Integer(i64::from(value)))
}

fn recorded_at() -> Result<i64, HistoryStoreError> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| HistoryStoreError::Sqlite {
            operation: "stamp history entry",
            source: SqliteError::ToSqlConversionFailure(Box::new(err)),
        })?;
    i64::try_from(duration.as_secs()).map_err(|err| HistoryStoreError::Sqlite {
        operation: "stamp history entry",
        source: SqliteError::ToSqlConversionFailure(Box::new(err)),
    })
}

/// One history row as stored, before the lane tree is rebuilt.
struct StoredRow {
    details: CrossingDetails,
    date: Option<String>,
    time: Option<String>,
    stale: bool,
    lanes: Vec<(LaneSlot, LaneMetric)>,
    raw_payload: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let details = CrossingDetails {
            port_code: row.get(0)?,
            port_name: row.get(1)?,
            crossing_name: row.get(2)?,
            state: row.get(3)?,
            region: row.get(4)?,
            border: row.get(5)?,
            hours: row.get(6)?,
            notice: row.get(7)?,
            note: row.get(8)?,
            port_status: row.get(9)?,
        };

        let mut lanes = Vec::with_capacity(LaneSlot::ALL.len());
        let mut column = FIRST_LANE_COLUMN;
        for slot in LaneSlot::ALL {
            let mut metric = LaneMetric::absent();
            for field in LaneMetricField::ALL {
                match field {
                    LaneMetricField::DelayMinutes => metric.delay_minutes = row.get(column)?,
                    LaneMetricField::LanesOpen => metric.lanes_open = row.get(column)?,
                    LaneMetricField::UpdateTime => metric.update_time = row.get(column)?,
                }
                column += 1;
            }
            lanes.push((slot, metric));
        }

        Ok(Self {
            details,
            date: row.get(10)?,
            time: row.get(11)?,
            stale: row.get(DETAIL_COLUMNS.len())?,
            lanes,
            raw_payload: row.get(column)?,
        })
    }

    fn into_crossing(self) -> Result<CanonicalCrossing, HistoryStoreError> {
        let raw: RawCrossing = match serde_json::from_str(&self.raw_payload)
            .map_err(|source| HistoryStoreError::Payload { source })?
        {
            Value::Object(map) => map,
            _ => RawCrossing::new(),
        };
        let mut crossing = build_tree(FlatCrossing {
            details: self.details,
            date: self.date,
            time: self.time,
            lanes: self.lanes,
            raw,
        })?;
        crossing.stale = self.stale;
        Ok(crossing)
    }
}

/// Errors raised by [`SqliteHistoryStore`].
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    /// The directory holding the database could not be created.
    #[error("failed to create directory for history database {path}")]
    CreateDir {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The database file could not be opened.
    #[error("failed to open history database {path}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// SQLite error.
        #[source]
        source: SqliteError,
    },
    /// Schema initialisation failed.
    #[error(transparent)]
    Schema(#[from] HistorySchemaError),
    /// A SQLite statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// What the store was doing.
        operation: &'static str,
        /// SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The raw payload could not be encoded or decoded.
    #[error("failed to process stored raw payload")]
    Payload {
        /// JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A stored row could not be rebuilt into a lane tree.
    #[error(transparent)]
    LaneTree(#[from] LaneTreeError),
}
