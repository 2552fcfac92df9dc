//! Record shapes produced by the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::LaneSlot;
use crate::time::ResolvedTime;

/// One decoded crossing entry, exactly as the feed decoder produced it.
pub type RawCrossing = Map<String, Value>;

/// Delay, open-lane count and update time for one lane slot.
///
/// Placeholder tokens never reach this type; they are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneMetric {
    /// Reported delay in minutes. Zero is a real reading.
    pub delay_minutes: Option<u32>,
    /// Number of open lanes.
    pub lanes_open: Option<u32>,
    /// Last update time as published, e.g. `At 2:00 pm EDT`.
    pub update_time: Option<String>,
}

impl LaneMetric {
    /// Metric with every field absent.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            delay_minutes: None,
            lanes_open: None,
            update_time: None,
        }
    }

    /// Report whether every field is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.delay_minutes.is_none() && self.lanes_open.is_none() && self.update_time.is_none()
    }
}

/// Passenger vehicle lanes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerLanes {
    /// General lanes.
    #[serde(rename = "standard_lanes")]
    pub standard: LaneMetric,
    /// Ready Lanes.
    #[serde(rename = "ready_lanes")]
    pub ready: LaneMetric,
    /// NEXUS/SENTRI lanes.
    #[serde(rename = "sentri_lanes")]
    pub sentri: LaneMetric,
}

/// Commercial vehicle lanes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialLanes {
    /// General lanes.
    #[serde(rename = "standard_lanes")]
    pub standard: LaneMetric,
    /// FAST lanes.
    #[serde(rename = "FAST_lanes")]
    pub fast: LaneMetric,
}

/// Pedestrian lanes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedestrianLanes {
    /// General lanes.
    #[serde(rename = "standard_lanes")]
    pub standard: LaneMetric,
    /// Ready Lanes.
    #[serde(rename = "ready_lanes")]
    pub ready: LaneMetric,
    /// SENTRI lanes.
    #[serde(rename = "sentri_lanes")]
    pub sentri: LaneMetric,
    /// Combined Ready/SENTRI lanes.
    #[serde(rename = "ready_sentri_lanes")]
    pub ready_sentri: LaneMetric,
}

/// Identity and descriptive fields of a crossing.
///
/// Missing fields are empty strings, not `None`, so display consumers keep
/// rendering blank cells the way they always have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingDetails {
    /// Port identifier.
    pub port_code: String,
    /// Port display name.
    pub port_name: String,
    /// Crossing display name.
    pub crossing_name: String,
    /// State or province.
    pub state: String,
    /// Field office region.
    pub region: String,
    /// Border the port sits on.
    pub border: String,
    /// Opening hours.
    pub hours: String,
    /// Construction or operational notice.
    pub notice: String,
    /// Free-form note.
    pub note: String,
    /// Open/closed status.
    pub port_status: String,
}

impl CrossingDetails {
    /// Human-readable identifier used in diagnostics.
    ///
    /// Prefers the port name, then the port code, then the crossing name.
    #[must_use]
    pub fn label(&self) -> &str {
        [&self.port_name, &self.port_code, &self.crossing_name]
            .into_iter()
            .find(|text| !text.trim().is_empty())
            .map_or("<unnamed crossing>", String::as_str)
    }
}

/// Normaliser output: one metric per lane slot, not yet nested.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatCrossing {
    /// Identity and descriptive fields.
    pub details: CrossingDetails,
    /// Sanitised upstream date.
    pub date: Option<String>,
    /// Sanitised upstream time.
    pub time: Option<String>,
    /// Lane metrics keyed by slot, in [`LaneSlot::ALL`] order.
    pub lanes: Vec<(LaneSlot, LaneMetric)>,
    /// The entry the record was built from.
    pub raw: RawCrossing,
}

impl FlatCrossing {
    /// Metric recorded for `slot`, if the record carries one.
    #[must_use]
    pub fn lane(&self, slot: LaneSlot) -> Option<&LaneMetric> {
        self.lanes
            .iter()
            .find_map(|(candidate, metric)| (*candidate == slot).then_some(metric))
    }
}

/// The canonical, nested crossing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCrossing {
    /// Identity and descriptive fields.
    #[serde(flatten)]
    pub details: CrossingDetails,
    /// Report date.
    pub date: Option<String>,
    /// Report time; always set on recorded entries.
    pub time: Option<String>,
    /// Whether `time` is the unknown-time sentinel.
    #[serde(default)]
    pub stale: bool,
    /// Passenger vehicle lanes.
    #[serde(rename = "passenger_vehicle_lanes")]
    pub passenger: PassengerLanes,
    /// Commercial vehicle lanes.
    #[serde(rename = "commercial_vehicle_lanes")]
    pub commercial: CommercialLanes,
    /// Pedestrian lanes.
    #[serde(rename = "pedestrian_lanes")]
    pub pedestrian: PedestrianLanes,
    /// Original feed entry, kept for audit.
    #[serde(default)]
    pub raw_payload: Value,
}

impl CanonicalCrossing {
    /// Metric stored at `slot`.
    #[must_use]
    pub const fn lane(&self, slot: LaneSlot) -> &LaneMetric {
        match slot {
            LaneSlot::PassengerStandard => &self.passenger.standard,
            LaneSlot::PassengerReady => &self.passenger.ready,
            LaneSlot::PassengerSentri => &self.passenger.sentri,
            LaneSlot::CommercialStandard => &self.commercial.standard,
            LaneSlot::CommercialFast => &self.commercial.fast,
            LaneSlot::PedestrianStandard => &self.pedestrian.standard,
            LaneSlot::PedestrianReady => &self.pedestrian.ready,
            LaneSlot::PedestrianSentri => &self.pedestrian.sentri,
            LaneSlot::PedestrianReadySentri => &self.pedestrian.ready_sentri,
        }
    }
}

/// Deduplication key of a historical entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Port identifier; empty when the feed omitted it.
    pub port_code: String,
    /// Report date, if published.
    pub date: Option<String>,
    /// Resolved report time.
    pub time: String,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.port_code,
            self.date.as_deref().unwrap_or("-"),
            self.time
        )
    }
}

/// A canonical record ready for durable storage.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalEntry {
    key: IdentityKey,
    crossing: CanonicalCrossing,
}

impl HistoricalEntry {
    /// Stamp `crossing` with its resolved time and derive the identity key.
    #[must_use]
    pub fn new(mut crossing: CanonicalCrossing, resolved: ResolvedTime) -> Self {
        let ResolvedTime {
            date, time, stale, ..
        } = resolved;
        let key = IdentityKey {
            port_code: crossing.details.port_code.clone(),
            date: date.clone(),
            time: time.clone(),
        };
        crossing.date = date;
        crossing.time = Some(time);
        crossing.stale = stale;
        Self { key, crossing }
    }

    /// Deduplication key.
    #[must_use]
    pub const fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// The stamped canonical record.
    #[must_use]
    pub const fn crossing(&self) -> &CanonicalCrossing {
        &self.crossing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeSource;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn crossing() -> CanonicalCrossing {
        CanonicalCrossing {
            details: CrossingDetails {
                port_code: "250401".into(),
                port_name: "San Ysidro".into(),
                ..CrossingDetails::default()
            },
            date: None,
            time: None,
            stale: false,
            passenger: PassengerLanes::default(),
            commercial: CommercialLanes::default(),
            pedestrian: PedestrianLanes::default(),
            raw_payload: Value::Null,
        }
    }

    #[rstest]
    fn entry_carries_resolved_time(crossing: CanonicalCrossing) {
        let entry = HistoricalEntry::new(
            crossing,
            ResolvedTime {
                date: Some("10/19/2026".into()),
                time: "00:00".into(),
                stale: true,
                source: TimeSource::Sentinel,
            },
        );
        assert_eq!(
            entry.key(),
            &IdentityKey {
                port_code: "250401".into(),
                date: Some("10/19/2026".into()),
                time: "00:00".into(),
            }
        );
        assert_eq!(entry.crossing().time.as_deref(), Some("00:00"));
        assert!(entry.crossing().stale);
    }

    #[rstest]
    fn serialises_with_feed_key_names(crossing: CanonicalCrossing) {
        let value = serde_json::to_value(&crossing).expect("serialise crossing");
        assert_eq!(value["port_name"], json!("San Ysidro"));
        assert!(value["commercial_vehicle_lanes"]["FAST_lanes"].is_object());
        assert_eq!(
            value["pedestrian_lanes"]["ready_sentri_lanes"],
            json!({"delay_minutes": null, "lanes_open": null, "update_time": null})
        );
    }

    #[rstest]
    #[case("San Ysidro", "250401", "San Ysidro")]
    #[case("", "250401", "250401")]
    #[case(" ", "", "<unnamed crossing>")]
    fn label_falls_back(#[case] name: &str, #[case] code: &str, #[case] expected: &str) {
        let details = CrossingDetails {
            port_name: name.into(),
            port_code: code.into(),
            ..CrossingDetails::default()
        };
        assert_eq!(details.label(), expected);
    }
}
