//! Read and record paths over one fetched feed.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    CanonicalCrossing, HistoricalEntry, LaneTreeError, RawCrossing, ScalarField, build_tree,
    detect_anomalies, normalize, report_anomalies, resolve_time, sanitize_text,
    schema::resolve_scalar,
};

/// Name listed for crossings that publish no `crossing_name`.
const UNKNOWN_CROSSING: &str = "Unknown";

/// Canonical crossings of one fetch, as served to readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitTimesSummary {
    /// Number of crossings in the summary.
    pub ports_found: usize,
    /// One canonical record per crossing, in feed order.
    pub all_ports_summary: Vec<CanonicalCrossing>,
}

/// Normalise and nest one raw crossing for the read path.
///
/// Anomalies are reported on the `log` facade. Date and time are the
/// upstream values and the record is never marked stale here.
///
/// # Errors
///
/// Propagates [`LaneTreeError`] from [`build_tree`].
pub fn canonicalise(raw: &RawCrossing) -> Result<CanonicalCrossing, LaneTreeError> {
    report_anomalies(&detect_anomalies(raw));
    build_tree(normalize(raw))
}

/// Build the historical entry for one raw crossing.
///
/// Runs the record path up to the store: normalise, report anomalies,
/// resolve the effective time and nest the lanes.
///
/// # Errors
///
/// Propagates [`LaneTreeError`] from [`build_tree`].
///
/// # Examples
///
/// ```
/// use border_wait_core::prepare_entry;
/// use serde_json::json;
///
/// let raw = json!({
///     "port_code": "250401",
///     "passenger_vehicle_lanes": {"standard_lanes": {"update_time": "08:15"}}
/// });
/// let entry = prepare_entry(raw.as_object().expect("object literal"))?;
/// assert_eq!(entry.key().time, "08:15");
/// assert!(!entry.crossing().stale);
/// # Ok::<(), border_wait_core::LaneTreeError>(())
/// ```
pub fn prepare_entry(raw: &RawCrossing) -> Result<HistoricalEntry, LaneTreeError> {
    let flat = normalize(raw);
    report_anomalies(&detect_anomalies(raw));
    let resolved = resolve_time(raw, &flat);
    let crossing = build_tree(flat)?;
    Ok(HistoricalEntry::new(crossing, resolved))
}

/// Canonicalise every crossing of a fetch, keeping feed order.
///
/// # Errors
///
/// Fails on the first crossing whose lanes cannot be nested.
pub fn summarise(crossings: &[RawCrossing]) -> Result<WaitTimesSummary, LaneTreeError> {
    let all_ports_summary = crossings
        .iter()
        .map(canonicalise)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WaitTimesSummary {
        ports_found: all_ports_summary.len(),
        all_ports_summary,
    })
}

/// Sorted, deduplicated crossing names.
///
/// Crossings without a usable `crossing_name` are listed as `Unknown`.
///
/// # Examples
///
/// ```
/// use border_wait_core::available_ports;
/// use serde_json::json;
///
/// let feed = json!([
///     {"crossing_name": "PedWest"},
///     {"crossing_name": "Bridge of the Americas"},
///     {"crossing_name": "PedWest"},
///     {"port_name": "Tecate"}
/// ]);
/// let crossings: Vec<_> = feed
///     .as_array()
///     .expect("array literal")
///     .iter()
///     .filter_map(|entry| entry.as_object().cloned())
///     .collect();
/// assert_eq!(
///     available_ports(&crossings),
///     ["Bridge of the Americas", "PedWest", "Unknown"]
/// );
/// ```
#[must_use]
pub fn available_ports(crossings: &[RawCrossing]) -> Vec<String> {
    crossings
        .iter()
        .map(|raw| {
            sanitize_text(resolve_scalar(raw, ScalarField::CrossingName))
                .unwrap_or_else(|| UNKNOWN_CROSSING.to_owned())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
