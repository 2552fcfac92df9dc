//! Effective report time and staleness.

use serde::{Deserialize, Serialize};

use crate::schema::resolve_scalar;
use crate::{FlatCrossing, LaneSlot, RawCrossing, ScalarField, sanitize_text};

/// Time recorded when neither the feed nor the lanes publish one.
pub const UNKNOWN_TIME: &str = "00:00";

/// Where a resolved time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// The entry's own `time` field.
    Feed,
    /// The passenger standard lane's `update_time`.
    PassengerStandardUpdate,
    /// [`UNKNOWN_TIME`].
    Sentinel,
}

/// The `(date, time, stale)` triple used for identity keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTime {
    /// Upstream date; there is no fallback.
    pub date: Option<String>,
    /// Effective time, never empty.
    pub time: String,
    /// Set only when `time` is the sentinel.
    pub stale: bool,
    /// Step of the fallback chain that produced `time`.
    pub source: TimeSource,
}

/// Resolve the effective date and time of a crossing.
///
/// Tries the upstream `time`, then the passenger standard lane's
/// `update_time`, then falls back to [`UNKNOWN_TIME`] and marks the result
/// stale. The same input always resolves to the same triple.
///
/// # Examples
///
/// ```
/// use border_wait_core::{TimeSource, UNKNOWN_TIME, normalize, resolve_time};
/// use serde_json::json;
///
/// let raw = json!({"port_code": "250401", "date": "10/19/2026"});
/// let raw = raw.as_object().expect("object literal");
/// let resolved = resolve_time(raw, &normalize(raw));
/// assert_eq!(resolved.time, UNKNOWN_TIME);
/// assert!(resolved.stale);
/// assert_eq!(resolved.source, TimeSource::Sentinel);
/// assert_eq!(resolved.date.as_deref(), Some("10/19/2026"));
/// ```
#[must_use]
pub fn resolve_time(raw: &RawCrossing, flat: &FlatCrossing) -> ResolvedTime {
    let date = sanitize_text(resolve_scalar(raw, ScalarField::Date));
    let upstream = sanitize_text(resolve_scalar(raw, ScalarField::Time));
    let lane_update = || {
        flat.lane(LaneSlot::PassengerStandard)
            .and_then(|metric| metric.update_time.clone())
    };

    let (time, source) = match upstream {
        Some(time) => (time, TimeSource::Feed),
        None => lane_update().map_or_else(
            || (UNKNOWN_TIME.to_owned(), TimeSource::Sentinel),
            |time| (time, TimeSource::PassengerStandardUpdate),
        ),
    };

    ResolvedTime {
        date,
        time,
        stale: source == TimeSource::Sentinel,
        source,
    }
}
