//! Durable history capability handed to the recorder.

use crate::{HistoricalEntry, IdentityKey};

/// Storage for deduplicated historical entries.
///
/// The recorder never opens a store itself; callers pass one in. Implementers
/// that can enforce uniqueness atomically should do so in
/// [`insert_if_absent`](Self::insert_if_absent) and report `false` when the
/// key was taken between the lookup and the write.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use std::convert::Infallible;
/// use border_wait_core::{HistoricalEntry, HistoryStore, IdentityKey};
///
/// #[derive(Default)]
/// struct MapStore(BTreeMap<IdentityKey, HistoricalEntry>);
///
/// impl HistoryStore for MapStore {
///     type Error = Infallible;
///
///     fn contains(&self, key: &IdentityKey) -> Result<bool, Self::Error> {
///         Ok(self.0.contains_key(key))
///     }
///
///     fn insert_if_absent(&mut self, entry: &HistoricalEntry) -> Result<bool, Self::Error> {
///         if self.0.contains_key(entry.key()) {
///             return Ok(false);
///         }
///         self.0.insert(entry.key().clone(), entry.clone());
///         Ok(true)
///     }
/// }
///
/// let store = MapStore::default();
/// let key = IdentityKey { port_code: "250401".into(), date: None, time: "00:00".into() };
/// assert!(!store.contains(&key)?);
/// # Ok::<(), Infallible>(())
/// ```
pub trait HistoryStore {
    /// Error raised by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Report whether an entry with `key` is already stored.
    fn contains(&self, key: &IdentityKey) -> Result<bool, Self::Error>;

    /// Persist `entry` unless its key is already taken.
    ///
    /// Returns `true` when a row was written.
    fn insert_if_absent(&mut self, entry: &HistoricalEntry) -> Result<bool, Self::Error>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for &mut S {
    type Error = S::Error;

    fn contains(&self, key: &IdentityKey) -> Result<bool, Self::Error> {
        (**self).contains(key)
    }

    fn insert_if_absent(&mut self, entry: &HistoricalEntry) -> Result<bool, Self::Error> {
        (**self).insert_if_absent(entry)
    }
}
