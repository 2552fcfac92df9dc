//! Build one flat record per raw crossing entry.

use log::debug;
use serde_json::Value;

use crate::schema::{resolve_lane_value, resolve_scalar};
use crate::{
    CrossingDetails, FlatCrossing, LaneMetric, LaneMetricField, LaneSlot, RawCrossing,
    ScalarField, sanitize, sanitize_text,
};

/// Normalise a raw crossing into a flat record.
///
/// Lane metrics are resolved across every known spelling and sanitised, so a
/// missing sub-section yields an all-absent metric. Identity and descriptive
/// fields are copied as text and default to an empty string. `date` and
/// `time` are sanitised and stay `None` when the feed omits them.
///
/// # Examples
///
/// ```
/// use border_wait_core::{LaneSlot, normalize};
/// use serde_json::json;
///
/// let raw = json!({
///     "port_name": "San Ysidro",
///     "passenger_vehicle_lanes": {"standard_lanes": {"delay_minutes": "45", "lanes_open": "N/A"}}
/// });
/// let flat = normalize(raw.as_object().expect("object literal"));
/// let standard = flat.lane(LaneSlot::PassengerStandard).expect("slot present");
/// assert_eq!(standard.delay_minutes, Some(45));
/// assert_eq!(standard.lanes_open, None);
/// assert_eq!(flat.details.port_code, "");
/// ```
#[must_use]
pub fn normalize(raw: &RawCrossing) -> FlatCrossing {
    let details = crossing_details(raw);

    let lanes = LaneSlot::ALL
        .iter()
        .map(|slot| (*slot, lane_metric(raw, *slot, &details)))
        .collect();

    FlatCrossing {
        date: sanitize_text(resolve_scalar(raw, ScalarField::Date)),
        time: sanitize_text(resolve_scalar(raw, ScalarField::Time)),
        details,
        lanes,
        raw: raw.clone(),
    }
}

/// Identity and descriptive fields of `raw`, without touching lane data.
pub(crate) fn crossing_details(raw: &RawCrossing) -> CrossingDetails {
    let text = |field| descriptive_text(raw, field);
    CrossingDetails {
        port_code: text(ScalarField::PortCode),
        port_name: text(ScalarField::PortName),
        crossing_name: text(ScalarField::CrossingName),
        state: text(ScalarField::State),
        region: text(ScalarField::Region),
        border: text(ScalarField::Border),
        hours: text(ScalarField::Hours),
        notice: text(ScalarField::Notice),
        note: text(ScalarField::Note),
        port_status: text(ScalarField::PortStatus),
    }
}

fn lane_metric(raw: &RawCrossing, slot: LaneSlot, details: &CrossingDetails) -> LaneMetric {
    let count = |metric: LaneMetricField| {
        let value = sanitize(resolve_lane_value(raw, slot, metric))?;
        let parsed = parse_count(&value);
        if parsed.is_none() {
            debug!(
                "{}: ignoring non-numeric {slot}.{} value {value}",
                details.label(),
                metric.name()
            );
        }
        parsed
    };

    LaneMetric {
        delay_minutes: count(LaneMetricField::DelayMinutes),
        lanes_open: count(LaneMetricField::LanesOpen),
        update_time: sanitize_text(resolve_lane_value(raw, slot, LaneMetricField::UpdateTime)),
    }
}

fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.parse().ok(),
        Value::Object(map) => map.get("#text").and_then(parse_count),
        _ => None,
    }
}

fn descriptive_text(raw: &RawCrossing, field: ScalarField) -> String {
    match resolve_scalar(raw, field) {
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Object(map)) => map
            .get("#text")
            .and_then(Value::as_str)
            .map(|text| text.trim().to_owned())
            .unwrap_or_default(),
        Some(Value::Array(_) | Value::Null) | None => String::new(),
    }
}
