//! Advisory diagnostics for schema drift.
//!
//! Anomalies never change the canonical record. They exist so operators
//! notice when the feed grows a new field or stops publishing a lane type.

use std::fmt;

use log::warn;

use crate::normalize::crossing_details;
use crate::schema::{is_known_top_level_key, resolve_lane_section};
use crate::{LaneSlot, RawCrossing};

/// What looked unusual about a raw crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyKind {
    /// A top-level key no known feed revision uses.
    UnknownField {
        /// The unexpected key.
        key: String,
    },
    /// An expected lane sub-section was absent or empty.
    MissingLaneSection {
        /// Slot whose section was not found.
        slot: LaneSlot,
    },
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { key } => write!(f, "unrecognised field `{key}`"),
            Self::MissingLaneSection { slot } => write!(f, "missing lane section {slot}"),
        }
    }
}

/// One diagnostic event for one crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    /// Port name, port code or crossing name of the offending entry.
    pub crossing: String,
    /// What was detected.
    pub kind: AnomalyKind,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.crossing, self.kind)
    }
}

/// Inspect `raw` for missing lane sections and unknown top-level keys.
///
/// Missing sections are listed in [`LaneSlot::ALL`] order, followed by
/// unknown keys in key order.
///
/// # Examples
///
/// ```
/// use border_wait_core::{AnomalyKind, LaneSlot, detect_anomalies};
/// use serde_json::json;
///
/// let raw = json!({"port_name": "Calexico", "automation": "Y"});
/// let anomalies = detect_anomalies(raw.as_object().expect("object literal"));
/// assert_eq!(anomalies.len(), LaneSlot::ALL.len() + 1);
/// assert_eq!(
///     anomalies.last().map(|anomaly| &anomaly.kind),
///     Some(&AnomalyKind::UnknownField { key: "automation".into() })
/// );
/// ```
#[must_use]
pub fn detect_anomalies(raw: &RawCrossing) -> Vec<Anomaly> {
    let crossing = crossing_details(raw).label().to_owned();
    let missing = LaneSlot::ALL
        .into_iter()
        .filter(|slot| resolve_lane_section(raw, *slot).is_none())
        .map(|slot| AnomalyKind::MissingLaneSection { slot });
    let unknown = raw
        .keys()
        .filter(|key| !is_known_top_level_key(key))
        .map(|key| AnomalyKind::UnknownField { key: key.clone() });

    missing
        .chain(unknown)
        .map(|kind| Anomaly {
            crossing: crossing.clone(),
            kind,
        })
        .collect()
}

/// Emit each anomaly as a warning on the `log` facade.
pub fn report_anomalies(anomalies: &[Anomaly]) {
    for anomaly in anomalies {
        warn!("schema anomaly in {anomaly}");
    }
}
