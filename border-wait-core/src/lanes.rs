//! Nest flat lane slots into traffic-category groups.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::{
    CanonicalCrossing, CommercialLanes, FlatCrossing, LaneMetric, LaneSlot, PassengerLanes,
    PedestrianLanes,
};

/// Errors raised while nesting lane slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaneTreeError {
    /// The flat record carried the same slot more than once.
    #[error("lane slot {slot} appears more than once in {crossing}")]
    DuplicateSlot {
        /// Slot that was repeated.
        slot: LaneSlot,
        /// Crossing label for diagnostics.
        crossing: String,
    },
    /// A position in the nested shape had no flat slot to fill it.
    #[error("lane slot {slot} is missing from {crossing}")]
    MissingSlot {
        /// Slot with no value.
        slot: LaneSlot,
        /// Crossing label for diagnostics.
        crossing: String,
    },
}

/// Reassign the nine flat lane slots to their nested positions.
///
/// Every slot must appear exactly once. The returned record carries the
/// upstream date and time unchanged and is not stale; recording paths stamp
/// the resolved time afterwards.
///
/// # Errors
///
/// Returns [`LaneTreeError::DuplicateSlot`] when a slot is repeated and
/// [`LaneTreeError::MissingSlot`] when a nested position stays empty.
///
/// # Examples
///
/// ```
/// use border_wait_core::{build_tree, normalize};
/// use serde_json::json;
///
/// let raw = json!({"port_code": "250401", "time": "14:30"});
/// let flat = normalize(raw.as_object().expect("object literal"));
/// let crossing = build_tree(flat)?;
/// assert_eq!(crossing.time.as_deref(), Some("14:30"));
/// assert!(crossing.passenger.standard.is_absent());
/// # Ok::<(), border_wait_core::LaneTreeError>(())
/// ```
pub fn build_tree(flat: FlatCrossing) -> Result<CanonicalCrossing, LaneTreeError> {
    let FlatCrossing {
        details,
        date,
        time,
        lanes,
        raw,
    } = flat;

    let mut slots = BTreeMap::new();
    for (slot, metric) in lanes {
        if slots.insert(slot, metric).is_some() {
            return Err(LaneTreeError::DuplicateSlot {
                slot,
                crossing: details.label().to_owned(),
            });
        }
    }

    let mut take = |slot: LaneSlot| -> Result<LaneMetric, LaneTreeError> {
        slots
            .remove(&slot)
            .ok_or_else(|| LaneTreeError::MissingSlot {
                slot,
                crossing: details.label().to_owned(),
            })
    };

    let passenger = PassengerLanes {
        standard: take(LaneSlot::PassengerStandard)?,
        ready: take(LaneSlot::PassengerReady)?,
        sentri: take(LaneSlot::PassengerSentri)?,
    };
    let commercial = CommercialLanes {
        standard: take(LaneSlot::CommercialStandard)?,
        fast: take(LaneSlot::CommercialFast)?,
    };
    let pedestrian = PedestrianLanes {
        standard: take(LaneSlot::PedestrianStandard)?,
        ready: take(LaneSlot::PedestrianReady)?,
        sentri: take(LaneSlot::PedestrianSentri)?,
        ready_sentri: take(LaneSlot::PedestrianReadySentri)?,
    };

    Ok(CanonicalCrossing {
        details,
        date,
        time,
        stale: false,
        passenger,
        commercial,
        pedestrian,
        raw_payload: Value::Object(raw),
    })
}
