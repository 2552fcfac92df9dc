//! Cross-module tests for the normalisation pipeline.


use crate::{LaneMetricField, LaneSlot, RawCrossing, canonicalise, normalize, resolve_time};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn object(value: Value) -> RawCrossing {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object fixture, got {other}"),
    }
}

/// Entry shaped like the current XML feed after decoding.
#[fixture]
fn current_revision() -> RawCrossing {
    object(json!({
        "port_number": "250401",
        "port_name": "San Ysidro",
        "crossing_name": "PedWest",
        "border": "Mexican Border",
        "date": "10/19/2026",
        "time": "14:30",
        "passenger_vehicle_lanes": {
            "standard_lanes": {"delay_minutes": "45", "lanes_open": "12", "update_time": "At 2:00 pm PDT"},
            "NEXUS_SENTRI_lanes": {"delay_minutes": "0", "lanes_open": "3", "update_time": "At 2:00 pm PDT"},
            "ready_lanes": {"delay_minutes": "Lanes Closed", "lanes_open": "N/A"}
        },
        "pedestrian_lanes": {
            "ready_sentri_lanes": {"delay_minutes": "5", "lanes_open": "1"}
        }
    }))
}

/// The same readings in the short-key layout of an older revision.
#[fixture]
fn legacy_revision() -> RawCrossing {
    object(json!({
        "port_code": "250401",
        "port_name": "San Ysidro",
        "crossing_name": "PedWest",
        "border": "Mexican Border",
        "date": "10/19/2026",
        "time": "14:30",
        "passenger_lanes": {
            "standard": {"delay": 45, "open_lanes": 12, "updated": "At 2:00 pm PDT"},
            "sentri": {"delay": 0, "open_lanes": 3, "updated": "At 2:00 pm PDT"},
            "ready": {"delay": "", "open_lanes": ""}
        },
        "pedestrian": {
            "ready_sentri": {"delay": "5", "open_lanes": "1"}
        }
    }))
}

#[rstest]
fn revisions_normalise_identically(current_revision: RawCrossing, legacy_revision: RawCrossing) {
    let current = normalize(&current_revision);
    let legacy = normalize(&legacy_revision);
    assert_eq!(current.details, legacy.details);
    assert_eq!(current.lanes, legacy.lanes);
    assert_eq!(
        resolve_time(&current_revision, &current),
        resolve_time(&legacy_revision, &legacy)
    );
}

#[rstest]
fn canonical_record_keeps_raw_payload(current_revision: RawCrossing) {
    let crossing = canonicalise(&current_revision).expect("canonical record");
    assert_eq!(crossing.raw_payload, Value::Object(current_revision));
    assert_eq!(crossing.passenger.sentri.delay_minutes, Some(0));
    assert!(crossing.passenger.ready.is_absent());
    assert_eq!(crossing.pedestrian.ready_sentri.lanes_open, Some(1));
}

#[rstest]
fn placeholders_never_reach_lane_metrics(current_revision: RawCrossing) {
    let crossing = canonicalise(&current_revision).expect("canonical record");
    for slot in LaneSlot::ALL {
        let metric = crossing.lane(slot);
        if let Some(update) = &metric.update_time {
            assert!(!crate::is_placeholder(update), "{slot} {}", LaneMetricField::UpdateTime.name());
        }
    }
}

#[rstest]
fn entry_without_any_lanes_is_not_an_error() {
    let crossing = canonicalise(&RawCrossing::new()).expect("canonical record");
    assert!(LaneSlot::ALL.into_iter().all(|slot| crossing.lane(slot).is_absent()));
    assert_eq!(crossing.details.port_code, "");
}
