use crate::error::{IndexError, Result};
use crate::hash;
use serde::{Deserialize, Serialize};

/// Slots allocated per expected key; keeps the load factor near one third.
pub const SLOTS_PER_KEY: usize = 3;

/// Snapshot of a table's diagnostic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub used: usize,
    pub collisions: u64,
    pub lookups: u64,
}

#[derive(Debug, Clone)]
enum Slot<V> {
    Empty,
    Occupied { key: String, value: V },
}

/// Fixed-capacity, linearly probed string-keyed table shared by the local and global
/// tables. It never grows: once every slot is used, inserts are refused.
#[derive(Debug, Clone)]
pub(crate) struct OpenTable<V> {
    slots: Vec<Slot<V>>,
    used: usize,
    collisions: u64,
    lookups: u64,
}

impl<V> OpenTable<V> {
    pub(crate) fn with_expected_keys(expected_keys: usize) -> Self {
        assert!(expected_keys > 0, "hash table must be sized for at least one key");
        let capacity = expected_keys.saturating_mul(SLOTS_PER_KEY);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Empty);
        Self { slots, used: 0, collisions: 0, lookups: 0 }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn is_full(&self) -> bool {
        self.used >= self.slots.len()
    }

    pub(crate) fn usage(&self) -> Usage {
        Usage { used: self.used, collisions: self.collisions, lookups: self.lookups }
    }

    /// Walk the probe sequence for `key`. Returns the slot holding it, or the first empty
    /// slot on its path, or `None` when the whole table was walked without finding either.
    fn probe(&mut self, key: &str) -> Option<usize> {
        let capacity = self.slots.len();
        let mut index = hash::bucket(key, capacity);
        for _ in 0..capacity {
            match &self.slots[index] {
                Slot::Occupied { key: k, .. } if k != key => {
                    index = (index + 1) % capacity;
                    self.collisions += 1;
                }
                _ => return Some(index),
            }
        }
        None
    }

    /// Public lookup path: counts one lookup, then probes.
    pub(crate) fn find(&mut self, key: &str) -> Option<usize> {
        self.lookups += 1;
        self.probe(key)
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<&V> {
        match self.slots.get(index)? {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty => None,
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<&V> {
        let index = self.find(key)?;
        self.value_at(index)
    }

    /// Return the value stored under `key`, inserting `init()` into its empty slot first
    /// when absent. The flag is `true` when a new entry was created.
    ///
    /// A full table refuses the call before probing, even for keys already present, and
    /// leaves slots and counters untouched.
    pub(crate) fn get_or_insert_with(
        &mut self,
        key: &str,
        init: impl FnOnce() -> V,
    ) -> Result<(&mut V, bool)> {
        if self.is_full() {
            return Err(IndexError::TableFull { capacity: self.capacity() });
        }
        let index = self
            .find(key)
            .ok_or(IndexError::TableFull { capacity: self.slots.len() })?;
        let inserted = matches!(self.slots[index], Slot::Empty);
        if inserted {
            self.slots[index] = Slot::Occupied { key: key.to_string(), value: init() };
            self.used += 1;
        }
        match &mut self.slots[index] {
            Slot::Occupied { value, .. } => Ok((value, inserted)),
            Slot::Empty => unreachable!("slot {index} was just filled"),
        }
    }

    /// Empty every slot and zero the counters, keeping the allocation.
    pub(crate) fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.used = 0;
        self.collisions = 0;
        self.lookups = 0;
    }

    /// Every slot in physical order; `None` for empty slots.
    pub(crate) fn slots(&self) -> impl Iterator<Item = Option<(&str, &V)>> + '_ {
        self.slots.iter().map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key.as_str(), value)),
            Slot::Empty => None,
        })
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.slots().flatten()
    }
}
