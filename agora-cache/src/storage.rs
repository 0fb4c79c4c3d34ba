//! Storage mechanisms.
//!
//! A storage only knows how to keep, drop, and enumerate slots. It never
//! decides whether a slot is still valid; that is the policy's job.

use std::collections::HashMap;
use std::hash::Hash;

/// One cache slot: the value and the metadata its validity policy stamped
/// on it at `put` time.
///
/// Keeping both in the same slot means they are written and removed
/// together.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<V, M> {
    /// Cached payload
    pub value: V,
    /// Policy metadata (e.g. insertion time)
    pub meta: M,
}

impl<V, M> Entry<V, M> {
    /// Creates a slot.
    pub fn new(value: V, meta: M) -> Self {
        Self { value, meta }
    }
}

/// Storage primitives, free of any validity logic.
pub trait Storage<K, V, M>: Send {
    /// Returns the slot for `key`, valid or not.
    fn read(&self, key: &K) -> Option<&Entry<V, M>>;

    /// Writes the slot for `key`, replacing any previous one.
    fn write(&mut self, key: K, entry: Entry<V, M>);

    /// Removes and returns the slot for `key`.
    fn remove(&mut self, key: &K) -> Option<Entry<V, M>>;

    /// Removes every slot.
    fn clear(&mut self);

    /// Number of slots currently held.
    fn len(&self) -> usize;

    /// Returns true if no slot is held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the slots for which `keep` returns true.
    fn retain(&mut self, keep: &mut dyn FnMut(&K, &Entry<V, M>) -> bool);
}

/// In-process `HashMap` storage.
#[derive(Debug)]
pub struct MapStorage<K, V, M> {
    entries: HashMap<K, Entry<V, M>>,
}

impl<K, V, M> MapStorage<K, V, M> {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates an empty storage with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }
}

impl<K, V, M> Default for MapStorage<K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, M> Storage<K, V, M> for MapStorage<K, V, M>
where
    K: Eq + Hash + Send,
    V: Send,
    M: Send,
{
    fn read(&self, key: &K) -> Option<&Entry<V, M>> {
        self.entries.get(key)
    }

    fn write(&mut self, key: K, entry: Entry<V, M>) {
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &K) -> Option<Entry<V, M>> {
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&K, &Entry<V, M>) -> bool) {
        self.entries.retain(|k, e| keep(k, e));
    }
}
