//! Unit tests for the SQLite history store.


use super::{
    HistorySchemaError, HistoryStoreError, SCHEMA_VERSION, SqliteHistoryStore, initialise_schema,
};
use border_wait_core::{
    HistoricalEntry, HistoryStore, LaneSlot, RawCrossing, UNKNOWN_TIME, prepare_entry,
    record_pass,
};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use rusqlite::Connection;
use serde_json::{Value, json};
use tempfile::TempDir;

fn raw(value: Value) -> RawCrossing {
    match value {
        Value::Object(map) => map,
        other => panic!("crossing fixture must be an object, got {other}"),
    }
}

fn entry(value: Value) -> HistoricalEntry {
    prepare_entry(&raw(value)).expect("fixture crossing should canonicalise")
}

#[fixture]
fn store() -> SqliteHistoryStore {
    SqliteHistoryStore::open_in_memory().expect("open in-memory history")
}

#[fixture]
fn san_ysidro() -> Value {
    json!({
        "port_number": "250401",
        "port_name": "San Ysidro",
        "crossing_name": "San Ysidro",
        "date": "10/19/2026",
        "time": "14:30",
        "passenger_vehicle_lanes": {
            "standard_lanes": {"delay_minutes": "45", "lanes_open": "12", "update_time": "At 2:00 pm PDT"},
            "NEXUS_SENTRI_lanes": {"delay_minutes": "0", "lanes_open": "3"},
            "ready_lanes": {"delay_minutes": "Lanes Closed"}
        }
    })
}

#[rstest]
fn initialises_schema_records_version() -> Result<(), HistorySchemaError> {
    let mut connection = Connection::open_in_memory().expect("open in-memory database");
    initialise_schema(&mut connection)?;
    initialise_schema(&mut connection)?;

    let version: i64 = connection
        .query_row(
            "SELECT version FROM history_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .expect("schema version present");
    assert_eq!(version, SCHEMA_VERSION);
    Ok(())
}

#[rstest]
fn rejects_foreign_schema_version() {
    let mut connection = Connection::open_in_memory().expect("open in-memory database");
    initialise_schema(&mut connection).expect("initial schema");
    connection
        .execute("UPDATE history_schema_version SET version = 7", [])
        .expect("bump version");

    let err = initialise_schema(&mut connection).expect_err("mismatched version");
    assert!(matches!(
        err,
        HistorySchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found: 7
        }
    ));
}

#[rstest]
fn insert_is_idempotent_per_identity_key(mut store: SqliteHistoryStore, san_ysidro: Value) {
    let first = entry(san_ysidro);
    assert!(!store.contains(first.key()).expect("lookup"));
    assert!(store.insert_if_absent(&first).expect("first insert"));
    assert!(store.contains(first.key()).expect("lookup"));
    assert!(!store.insert_if_absent(&first).expect("second insert"));
    assert_eq!(store.count_entries().expect("count"), 1);
}

#[rstest]
fn absent_date_collides_with_itself(mut store: SqliteHistoryStore) {
    let undated = entry(json!({"port_number": "250401", "time": "14:30"}));
    assert_eq!(undated.key().date, None);
    assert!(store.insert_if_absent(&undated).expect("first insert"));
    assert!(!store.insert_if_absent(&undated).expect("second insert"));

    let dated = entry(json!({"port_number": "250401", "date": "10/19/2026", "time": "14:30"}));
    assert!(!store.contains(dated.key()).expect("lookup"));
    assert!(store.insert_if_absent(&dated).expect("dated insert"));
    assert_eq!(store.count_entries().expect("count"), 2);
}

#[rstest]
fn round_trips_lane_metrics(mut store: SqliteHistoryStore, san_ysidro: Value) {
    let stored = entry(san_ysidro);
    store.insert_if_absent(&stored).expect("insert");

    let entries = store.entries_for_port("250401").expect("read history");
    assert_eq!(entries.len(), 1);
    let loaded = &entries[0];
    assert_eq!(loaded, stored.crossing());

    let standard = loaded.lane(LaneSlot::PassengerStandard);
    assert_eq!(standard.delay_minutes, Some(45));
    assert_eq!(standard.update_time.as_deref(), Some("At 2:00 pm PDT"));
    assert_eq!(loaded.lane(LaneSlot::PassengerSentri).delay_minutes, Some(0));
    assert!(loaded.lane(LaneSlot::PassengerReady).is_absent());
    assert_eq!(loaded.raw_payload["port_number"], "250401");
}

#[rstest]
fn lists_entries_in_recording_order(mut store: SqliteHistoryStore) {
    let reports = [("12/31/2025", "23:00"), ("01/01/2026", "9:15"), ("01/01/2026", "10:30")];
    for (date, time) in reports {
        let report = entry(json!({"port_number": "250401", "date": date, "time": time}));
        store.insert_if_absent(&report).expect("insert");
    }
    store
        .insert_if_absent(&entry(json!({"port_number": "070801", "time": "10:00"})))
        .expect("insert other port");

    let listed: Vec<_> = store
        .entries_for_port("250401")
        .expect("read history")
        .into_iter()
        .map(|crossing| (crossing.date, crossing.time))
        .collect();
    let expected: Vec<_> = reports
        .iter()
        .map(|(date, time)| (Some((*date).to_owned()), Some((*time).to_owned())))
        .collect();
    assert_eq!(listed, expected);
}

#[rstest]
fn stale_flag_survives_storage(mut store: SqliteHistoryStore) {
    let stale = entry(json!({"port_number": "070801", "date": "10/19/2026"}));
    store.insert_if_absent(&stale).expect("insert");

    let entries = store.entries_for_port("070801").expect("read history");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].stale);
    assert_eq!(entries[0].time.as_deref(), Some(UNKNOWN_TIME));
}

#[rstest]
fn recorder_pass_against_sqlite(mut store: SqliteHistoryStore, san_ysidro: Value) {
    let crossings = vec![
        raw(san_ysidro.clone()),
        raw(san_ysidro),
        raw(json!({"port_number": "070801", "time": "10:00"})),
    ];
    let report = record_pass(&mut store, &crossings);
    assert!(report.is_clean());
    assert_eq!((report.inserted, report.skipped), (2, 1));
}

#[rstest]
fn reopening_keeps_history() {
    let dir = TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/history.db"))
        .expect("temp path should be UTF-8");
    let first = entry(json!({"port_number": "250401", "time": "14:30"}));

    {
        let mut store = SqliteHistoryStore::open(&path).expect("create history");
        store.insert_if_absent(&first).expect("insert");
    }

    let mut reopened = SqliteHistoryStore::open(&path).expect("reopen history");
    assert!(reopened.contains(first.key()).expect("lookup"));
    assert!(!reopened.insert_if_absent(&first).expect("insert again"));
    assert_eq!(reopened.count_entries().expect("count"), 1);
}

#[rstest]
fn open_reports_unusable_path() {
    let dir = TempDir::new().expect("create temp dir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").expect("write blocker file");
    let path = Utf8PathBuf::from_path_buf(blocker.join("history.db"))
        .expect("temp path should be UTF-8");

    let err = SqliteHistoryStore::open(&path).expect_err("parent is a file");
    assert!(matches!(
        err,
        HistoryStoreError::CreateDir { .. } | HistoryStoreError::Open { .. }
    ));
}
