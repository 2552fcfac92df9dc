//! Core normalisation and recording logic for the border wait feed.
//!
//! The upstream feed publishes one entry per border crossing, but its shape
//! drifts between revisions: sections are renamed, suffixes come and go, and
//! placeholder strings stand in for missing numbers. This crate turns each
//! decoded entry into one canonical [`CanonicalCrossing`] and records
//! deduplicated [`HistoricalEntry`] rows through a [`HistoryStore`].
//!
//! Responsibilities:
//! - Sanitise scalar leaves ([`sanitize`]).
//! - Resolve every logical field across known key spellings ([`schema`]).
//! - Build flat records and nest their lane slots ([`normalize`],
//!   [`build_tree`]).
//! - Report schema anomalies without failing ([`detect_anomalies`]).
//! - Resolve the effective time and staleness ([`resolve_time`]).
//! - Record entries once per identity key ([`Recorder`], [`record_pass`]).
//!
//! Boundaries:
//! - No I/O. Fetching, decoding, and the durable store live in
//!   `border-wait-data`; callers pass a store capability in.

#![forbid(unsafe_code)]

mod anomaly;
mod crossing;
mod lanes;
mod normalize;
mod pipeline;
mod recorder;
mod sanitize;
pub mod schema;
mod store;
mod time;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod tests;

pub use anomaly::{Anomaly, AnomalyKind, detect_anomalies, report_anomalies};
pub use crossing::{
    CanonicalCrossing, CommercialLanes, CrossingDetails, FlatCrossing, HistoricalEntry,
    IdentityKey, LaneMetric, PassengerLanes, PedestrianLanes, RawCrossing,
};
pub use lanes::{LaneTreeError, build_tree};
pub use normalize::normalize;
pub use pipeline::{WaitTimesSummary, available_ports, canonicalise, prepare_entry, summarise};
pub use recorder::{
    CrossingError, CrossingFailure, PassReport, RecordError, RecordOutcome, Recorder,
    record_pass,
};
pub use sanitize::{is_placeholder, sanitize, sanitize_text};
pub use schema::{LaneMetricField, LaneSlot, ScalarField, TrafficCategory};
pub use store::HistoryStore;
pub use time::{ResolvedTime, TimeSource, UNKNOWN_TIME, resolve_time};
