//! Test-only, in-memory `HistoryStore` implementation used by unit and
//! behaviour tests.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{HistoricalEntry, HistoryStore, IdentityKey};

/// Error returned by a [`MemoryHistoryStore`] configured to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("in-memory history store unavailable for {0}")]
pub struct MemoryStoreError(pub IdentityKey);

#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Healthy,
    BlindLookups,
    Unavailable,
    FailInsertsFor(String),
}

/// In-memory `HistoryStore` keyed by [`IdentityKey`].
///
/// Insertion keeps at most one entry per key, like the SQLite store's
/// unique index.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: BTreeMap<IdentityKey, HistoricalEntry>,
    mode: Mode,
}

impl MemoryHistoryStore {
    /// Store whose lookups always miss, as if another pass were writing
    /// concurrently.
    #[must_use]
    pub fn blind_to_lookups() -> Self {
        Self {
            mode: Mode::BlindLookups,
            ..Self::default()
        }
    }

    /// Store that fails every lookup and insert.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            mode: Mode::Unavailable,
            ..Self::default()
        }
    }

    /// Store that rejects inserts for `port_code` only.
    #[must_use]
    pub fn failing_inserts_for(port_code: &str) -> Self {
        Self {
            mode: Mode::FailInsertsFor(port_code.to_owned()),
            ..Self::default()
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entries in key order.
    #[must_use]
    pub fn entries(&self) -> impl Iterator<Item = &HistoricalEntry> {
        self.entries.values()
    }
}

impl HistoryStore for MemoryHistoryStore {
    type Error = MemoryStoreError;

    fn contains(&self, key: &IdentityKey) -> Result<bool, Self::Error> {
        match &self.mode {
            Mode::Unavailable => Err(MemoryStoreError(key.clone())),
            Mode::BlindLookups => Ok(false),
            Mode::Healthy | Mode::FailInsertsFor(_) => Ok(self.entries.contains_key(key)),
        }
    }

    fn insert_if_absent(&mut self, entry: &HistoricalEntry) -> Result<bool, Self::Error> {
        let key = entry.key();
        match &self.mode {
            Mode::Unavailable => return Err(MemoryStoreError(key.clone())),
            Mode::FailInsertsFor(port) if *port == key.port_code => {
                return Err(MemoryStoreError(key.clone()));
            }
            _ => {}
        }
        if self.entries.contains_key(key) {
            return Ok(false);
        }
        self.entries.insert(key.clone(), entry.clone());
        Ok(true)
    }
}
