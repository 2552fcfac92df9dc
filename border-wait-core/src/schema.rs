//! Key spellings observed across feed revisions.
//!
//! Every logical field maps to an ordered list of raw keys. Lookups try the
//! spellings in table order and stop at the first value that is present and
//! not `null`, so the rest of the pipeline never branches on feed revision.
//! Supporting a new revision means adding a spelling here.

use std::fmt;

use serde_json::{Map, Value};

use crate::RawCrossing;

/// Traffic category grouping a set of lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrafficCategory {
    /// Private vehicles.
    Passenger,
    /// Freight vehicles.
    Commercial,
    /// Travellers on foot.
    Pedestrian,
}

impl TrafficCategory {
    /// All categories in canonical order.
    pub const ALL: [Self; 3] = [Self::Passenger, Self::Commercial, Self::Pedestrian];

    /// Raw keys naming the category's group, most recent revision first.
    #[must_use]
    pub const fn group_keys(self) -> &'static [&'static str] {
        match self {
            Self::Passenger => &["passenger_vehicle_lanes", "passenger_lanes", "passenger"],
            Self::Commercial => &["commercial_vehicle_lanes", "commercial_lanes", "commercial"],
            Self::Pedestrian => &["pedestrian_lanes", "pedestrian"],
        }
    }
}

/// One lane type within one traffic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaneSlot {
    /// General passenger lanes.
    PassengerStandard,
    /// Passenger Ready Lanes.
    PassengerReady,
    /// Passenger NEXUS/SENTRI lanes.
    PassengerSentri,
    /// General commercial lanes.
    CommercialStandard,
    /// Commercial FAST lanes.
    CommercialFast,
    /// General pedestrian lanes.
    PedestrianStandard,
    /// Pedestrian Ready Lanes.
    PedestrianReady,
    /// Pedestrian SENTRI lanes.
    PedestrianSentri,
    /// Pedestrian lanes open to both Ready and SENTRI travellers.
    PedestrianReadySentri,
}

impl LaneSlot {
    /// Every slot, in the order the canonical record lists them.
    pub const ALL: [Self; 9] = [
        Self::PassengerStandard,
        Self::PassengerReady,
        Self::PassengerSentri,
        Self::CommercialStandard,
        Self::CommercialFast,
        Self::PedestrianStandard,
        Self::PedestrianReady,
        Self::PedestrianSentri,
        Self::PedestrianReadySentri,
    ];

    /// Category that owns this slot.
    #[must_use]
    pub const fn category(self) -> TrafficCategory {
        match self {
            Self::PassengerStandard | Self::PassengerReady | Self::PassengerSentri => {
                TrafficCategory::Passenger
            }
            Self::CommercialStandard | Self::CommercialFast => TrafficCategory::Commercial,
            Self::PedestrianStandard
            | Self::PedestrianReady
            | Self::PedestrianSentri
            | Self::PedestrianReadySentri => TrafficCategory::Pedestrian,
        }
    }

    /// Stable snake-case name, e.g. `passenger_standard`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PassengerStandard => "passenger_standard",
            Self::PassengerReady => "passenger_ready",
            Self::PassengerSentri => "passenger_sentri",
            Self::CommercialStandard => "commercial_standard",
            Self::CommercialFast => "commercial_fast",
            Self::PedestrianStandard => "pedestrian_standard",
            Self::PedestrianReady => "pedestrian_ready",
            Self::PedestrianSentri => "pedestrian_sentri",
            Self::PedestrianReadySentri => "pedestrian_ready_sentri",
        }
    }

    /// Raw keys naming the slot's section inside its category group.
    ///
    /// Passenger SENTRI lanes were published as `NEXUS_SENTRI_lanes` before
    /// the bare `sentri` spelling appeared; pedestrian SENTRI lanes went the
    /// other way round.
    #[must_use]
    pub const fn section_keys(self) -> &'static [&'static str] {
        match self {
            Self::PassengerStandard | Self::CommercialStandard | Self::PedestrianStandard => {
                &["standard_lanes", "standard"]
            }
            Self::PassengerReady | Self::PedestrianReady => &["ready_lanes", "ready"],
            Self::PassengerSentri => &[
                "NEXUS_SENTRI_lanes",
                "NEXUS/SENTRI_lanes",
                "NEXUS/SENTRI",
                "sentri_lanes",
                "sentri",
            ],
            Self::CommercialFast => &["FAST_lanes", "fast_lanes", "FAST", "fast"],
            Self::PedestrianSentri => &[
                "sentri_lanes",
                "sentri",
                "NEXUS_SENTRI_lanes",
                "NEXUS/SENTRI",
            ],
            Self::PedestrianReadySentri => &["ready_sentri_lanes", "ready_sentri"],
        }
    }
}

impl fmt::Display for LaneSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three measurements reported per lane slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaneMetricField {
    /// Reported delay in minutes.
    DelayMinutes,
    /// Number of open lanes.
    LanesOpen,
    /// Time the lane figures were last updated.
    UpdateTime,
}

impl LaneMetricField {
    /// Every metric, in canonical order.
    pub const ALL: [Self; 3] = [Self::DelayMinutes, Self::LanesOpen, Self::UpdateTime];

    /// Canonical name, e.g. `delay_minutes`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DelayMinutes => "delay_minutes",
            Self::LanesOpen => "lanes_open",
            Self::UpdateTime => "update_time",
        }
    }

    /// Raw keys naming the metric inside a lane section.
    #[must_use]
    pub const fn keys(self) -> &'static [&'static str] {
        match self {
            Self::DelayMinutes => &["delay_minutes", "delay"],
            Self::LanesOpen => &["lanes_open", "open_lanes"],
            Self::UpdateTime => &["update_time", "updated"],
        }
    }
}

/// Top-level scalar fields of a crossing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarField {
    /// Port identifier.
    PortCode,
    /// Port display name.
    PortName,
    /// Crossing display name within the port.
    CrossingName,
    /// State or province.
    State,
    /// CBP field office region.
    Region,
    /// Border the port sits on.
    Border,
    /// Opening hours.
    Hours,
    /// Construction or operational notice.
    Notice,
    /// Free-form note.
    Note,
    /// Open/closed status.
    PortStatus,
    /// Report date.
    Date,
    /// Report time.
    Time,
}

impl ScalarField {
    /// Every scalar field.
    pub const ALL: [Self; 12] = [
        Self::PortCode,
        Self::PortName,
        Self::CrossingName,
        Self::State,
        Self::Region,
        Self::Border,
        Self::Hours,
        Self::Notice,
        Self::Note,
        Self::PortStatus,
        Self::Date,
        Self::Time,
    ];

    /// Raw keys naming the field, preferred spelling first.
    #[must_use]
    pub const fn keys(self) -> &'static [&'static str] {
        match self {
            Self::PortCode => &["port_code", "port_number"],
            Self::PortName => &["port_name"],
            Self::CrossingName => &["crossing_name"],
            Self::State => &["state"],
            Self::Region => &["region"],
            Self::Border => &["border"],
            Self::Hours => &["hours"],
            Self::Notice => &["construction_notice", "notice"],
            Self::Note => &["note"],
            Self::PortStatus => &["port_status"],
            Self::Date => &["date"],
            Self::Time => &["time"],
        }
    }
}

/// Resolve a top-level scalar across its known spellings.
///
/// # Examples
///
/// ```
/// use border_wait_core::schema::{ScalarField, resolve_scalar};
/// use serde_json::json;
///
/// let raw = json!({"port_number": "250401"});
/// let raw = raw.as_object().expect("object literal");
/// assert_eq!(resolve_scalar(raw, ScalarField::PortCode), Some(&json!("250401")));
/// ```
#[must_use]
pub fn resolve_scalar(raw: &RawCrossing, field: ScalarField) -> Option<&Value> {
    first_present(raw, field.keys())
}

/// Resolve one lane metric across every spelling of its path.
///
/// Group, section and metric spellings are tried in table order; the first
/// value that is present and not `null` wins. Placeholders are returned as
/// found; masking them is the sanitiser's job.
///
/// # Examples
///
/// ```
/// use border_wait_core::schema::{LaneMetricField, LaneSlot, resolve_lane_value};
/// use serde_json::json;
///
/// let suffixed = json!({"passenger_vehicle_lanes": {"NEXUS_SENTRI_lanes": {"delay_minutes": "5"}}});
/// let short = json!({"passenger_vehicle_lanes": {"sentri": {"delay_minutes": "5"}}});
/// for raw in [&suffixed, &short] {
///     let raw = raw.as_object().expect("object literal");
///     let value = resolve_lane_value(raw, LaneSlot::PassengerSentri, LaneMetricField::DelayMinutes);
///     assert_eq!(value, Some(&json!("5")));
/// }
/// ```
#[must_use]
pub fn resolve_lane_value(
    raw: &RawCrossing,
    slot: LaneSlot,
    metric: LaneMetricField,
) -> Option<&Value> {
    lane_sections(raw, slot).find_map(|section| first_present(section, metric.keys()))
}

/// Find the first non-empty section for `slot` under any known spelling.
///
/// A section that decoded to `null`, a blank string or an empty object is
/// treated as missing.
#[must_use]
pub fn resolve_lane_section(raw: &RawCrossing, slot: LaneSlot) -> Option<&Map<String, Value>> {
    lane_sections(raw, slot).find(|section| !section.is_empty())
}

/// Report whether `key` is a top-level key some feed revision is known to use.
#[must_use]
pub fn is_known_top_level_key(key: &str) -> bool {
    ScalarField::ALL
        .iter()
        .flat_map(|field| field.keys())
        .chain(TrafficCategory::ALL.iter().flat_map(|category| category.group_keys()))
        .any(|known| *known == key)
}

fn lane_sections(raw: &RawCrossing, slot: LaneSlot) -> impl Iterator<Item = &Map<String, Value>> {
    let section_keys = slot.section_keys();
    slot.category()
        .group_keys()
        .iter()
        .filter_map(move |key| raw.get(*key).and_then(Value::as_object))
        .flat_map(move |group| {
            section_keys
                .iter()
                .filter_map(move |key| group.get(*key).and_then(Value::as_object))
        })
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: &Value) -> &RawCrossing {
        value.as_object().expect("test fixture should be an object")
    }

    #[rstest]
    #[case(json!({"passenger_vehicle_lanes": {"standard_lanes": {"delay_minutes": "45"}}}))]
    #[case(json!({"passenger_vehicle_lanes": {"standard": {"delay_minutes": "45"}}}))]
    #[case(json!({"passenger_lanes": {"standard_lanes": {"delay": "45"}}}))]
    #[case(json!({"passenger": {"standard": {"delay_minutes": "45"}}}))]
    fn resolves_every_spelling_to_the_same_value(#[case] raw: Value) {
        let value = resolve_lane_value(
            object(&raw),
            LaneSlot::PassengerStandard,
            LaneMetricField::DelayMinutes,
        );
        assert_eq!(value, Some(&json!("45")));
    }

    #[rstest]
    #[case(json!({"NEXUS_SENTRI_lanes": {"lanes_open": "2"}}))]
    #[case(json!({"NEXUS/SENTRI": {"lanes_open": "2"}}))]
    #[case(json!({"sentri": {"lanes_open": "2"}}))]
    fn resolves_sentri_variants(#[case] group: Value) {
        let raw = json!({ "passenger_vehicle_lanes": group });
        let value = resolve_lane_value(
            object(&raw),
            LaneSlot::PassengerSentri,
            LaneMetricField::LanesOpen,
        );
        assert_eq!(value, Some(&json!("2")));
    }

    #[rstest]
    fn prefers_earlier_spelling_when_both_present() {
        let raw = json!({
            "commercial_vehicle_lanes": {
                "FAST_lanes": {"delay_minutes": "10"},
                "fast": {"delay_minutes": "99"}
            }
        });
        let value = resolve_lane_value(
            object(&raw),
            LaneSlot::CommercialFast,
            LaneMetricField::DelayMinutes,
        );
        assert_eq!(value, Some(&json!("10")));
    }

    #[rstest]
    fn skips_null_values_for_later_spellings() {
        let raw = json!({
            "pedestrian_lanes": {
                "ready_sentri_lanes": {"delay_minutes": null, "delay": "3"}
            }
        });
        let value = resolve_lane_value(
            object(&raw),
            LaneSlot::PedestrianReadySentri,
            LaneMetricField::DelayMinutes,
        );
        assert_eq!(value, Some(&json!("3")));
    }

    #[rstest]
    fn returns_none_when_no_spelling_matches() {
        let raw = json!({"passenger_vehicle_lanes": {"ready_lanes": {}}});
        for slot in LaneSlot::ALL {
            for metric in LaneMetricField::ALL {
                assert_eq!(resolve_lane_value(object(&raw), slot, metric), None);
            }
        }
    }

    #[rstest]
    fn empty_sections_are_not_resolved() {
        let raw = json!({"pedestrian_lanes": {"standard_lanes": {}, "ready_lanes": null}});
        assert!(resolve_lane_section(object(&raw), LaneSlot::PedestrianStandard).is_none());
        assert!(resolve_lane_section(object(&raw), LaneSlot::PedestrianReady).is_none());
    }

    #[rstest]
    #[case("port_number", true)]
    #[case("construction_notice", true)]
    #[case("pedestrian_lanes", true)]
    #[case("passenger_automation_type", false)]
    fn knows_top_level_keys(#[case] key: &str, #[case] known: bool) {
        assert_eq!(is_known_top_level_key(key), known);
    }

    #[rstest]
    fn slots_cover_each_category() {
        for category in TrafficCategory::ALL {
            assert!(LaneSlot::ALL.iter().any(|slot| slot.category() == category));
        }
    }
}
