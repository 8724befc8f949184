//! Map with lazily materialized default values.
//! Carries no concurrency semantics; it is scratch state for callers which
//! index transient per-key bookkeeping (per-resource locks, per-key queues).
use std::collections::{hash_map::Entry, HashMap};
use std::{fmt, hash::Hash};

#[cfg(test)]
mod tests;

/// Map which materializes missing values through a factory on first access.
pub struct DefaultMap<K, V, F> {
    entries: HashMap<K, V>,
    default: F,
}

impl<K, V, F> fmt::Debug for DefaultMap<K, V, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("DefaultMap").finish_non_exhaustive()
    }
}

impl<K: Eq + Hash, V, F: FnMut(&K) -> V> DefaultMap<K, V, F> {
    /// Constructs an empty map with the given value factory.
    pub fn new(default: F) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// Returns the value under `key`, materializing (and storing) the
    /// default on first access. The factory runs at most once per key.
    pub fn get(&mut self, key: K) -> &mut V {
        let Self { entries, default } = self;
        match entries.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let value = default(e.key());
                e.insert(value)
            }
        }
    }

    /// Unconditionally overwrites the value under `key`.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Removes the entry without consulting the factory.
    /// Returns whether an entry existed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of materialized entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether no entry has been materialized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
