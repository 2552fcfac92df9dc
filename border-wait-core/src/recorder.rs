//! Deduplicated recording of historical entries.

use std::error::Error as StdError;

use log::{debug, warn};
use thiserror::Error;

use crate::{HistoricalEntry, HistoryStore, IdentityKey, LaneTreeError, RawCrossing};

type BoxedStoreError = Box<dyn StdError + Send + Sync + 'static>;

/// Result of recording one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new row was written.
    Inserted,
    /// An entry with the same identity key already existed.
    Skipped,
}

/// Errors raised by the backing store while recording.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Checking for an existing entry failed.
    #[error("failed to look up history entry {key}")]
    Lookup {
        /// Key being checked.
        key: IdentityKey,
        /// Store error.
        #[source]
        source: BoxedStoreError,
    },
    /// Writing the entry failed.
    #[error("failed to insert history entry {key}")]
    Insert {
        /// Key being written.
        key: IdentityKey,
        /// Store error.
        #[source]
        source: BoxedStoreError,
    },
}

/// Why a crossing could not be recorded.
#[derive(Debug, Error)]
pub enum CrossingError {
    /// The lane slots could not be nested.
    #[error(transparent)]
    LaneTree(#[from] LaneTreeError),
    /// The store rejected the lookup or the write.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A crossing that failed during a recording pass.
#[derive(Debug, Error)]
#[error("{crossing}: {error}")]
pub struct CrossingFailure {
    /// Label of the crossing.
    pub crossing: String,
    /// What went wrong.
    #[source]
    pub error: CrossingError,
}

/// Counts collected over one recording pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Entries written.
    pub inserted: usize,
    /// Entries whose identity key was already stored.
    pub skipped: usize,
    /// Crossings that failed, in feed order.
    pub failures: Vec<CrossingFailure>,
}

impl PassReport {
    /// Report whether every crossing was inserted or skipped.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Records entries at most once per identity key.
///
/// The recorder checks the store for the entry's key and inserts only when
/// it is absent. Two passes racing on one store can both see the key as
/// free; stores close that window in
/// [`HistoryStore::insert_if_absent`], and a write that finds the key taken
/// is reported as [`RecordOutcome::Skipped`].
#[derive(Debug)]
pub struct Recorder<S> {
    store: S,
}

impl<S: HistoryStore> Recorder<S> {
    /// Wrap `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Record `entry` unless its identity key is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the store fails. The store is left as it
    /// was before the call.
    pub fn record(&mut self, entry: &HistoricalEntry) -> Result<RecordOutcome, RecordError> {
        let key = entry.key();
        let exists = self
            .store
            .contains(key)
            .map_err(|source| RecordError::Lookup {
                key: key.clone(),
                source: Box::new(source),
            })?;
        if exists {
            debug!("history entry {key} already recorded");
            return Ok(RecordOutcome::Skipped);
        }

        let written = self
            .store
            .insert_if_absent(entry)
            .map_err(|source| RecordError::Insert {
                key: key.clone(),
                source: Box::new(source),
            })?;
        if written {
            Ok(RecordOutcome::Inserted)
        } else {
            debug!("history entry {key} was recorded concurrently");
            Ok(RecordOutcome::Skipped)
        }
    }

    /// Borrow the wrapped store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Return the wrapped store.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Run one recording pass over `crossings` in feed order.
///
/// Each crossing is normalised, checked for anomalies, time-resolved and
/// recorded. A crossing that fails is collected in
/// [`PassReport::failures`] and the pass moves on; entries recorded before
/// it stay recorded.
#[must_use]
pub fn record_pass<S: HistoryStore>(store: &mut S, crossings: &[RawCrossing]) -> PassReport {
    let mut recorder = Recorder::new(store);
    let mut report = PassReport::default();
    for raw in crossings {
        let outcome = crate::prepare_entry(raw)
            .map_err(CrossingError::from)
            .and_then(|entry| recorder.record(&entry).map_err(CrossingError::from));
        match outcome {
            Ok(RecordOutcome::Inserted) => report.inserted += 1,
            Ok(RecordOutcome::Skipped) => report.skipped += 1,
            Err(error) => {
                let crossing = crate::normalize::crossing_details(raw).label().to_owned();
                warn!("failed to record {crossing}: {error}");
                report.failures.push(CrossingFailure { crossing, error });
            }
        }
    }
    report
}
