use crate::key::{ElementKey, KeyMap, KeySet};
use crate::{DoubleBuffer, Size};

/// One resize observation: the content box plus the element's child count at that moment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub size: Size,
    pub child_count: usize,
}

/// Double-buffered per-element size record.
///
/// Reads for elements that were never observed default to `{0, 0}`. The engine forgets entries
/// for detached elements so the table tracks the live tree rather than growing without bound.
#[derive(Clone, Debug)]
pub struct SizeStore<K> {
    entries: KeyMap<K, DoubleBuffer<Measurement>>,
    changed: KeySet<K>,
}

impl<K> Default for SizeStore<K> {
    fn default() -> Self {
        Self {
            entries: KeyMap::default(),
            changed: KeySet::default(),
        }
    }
}

impl<K: ElementKey> SizeStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resize notification for `key`: the previous `new` moves to `old`.
    ///
    /// An element observed for the first time reads `old == {0, 0}`. Returns `true` when the
    /// content box differs from the previous observation.
    pub fn observe(&mut self, key: &K, size: Size, child_count: usize) -> bool {
        let next = Measurement { size, child_count };
        let buf = self
            .entries
            .entry(key.clone())
            .or_insert_with(DoubleBuffer::default);
        buf.push(next);
        let changed = buf.old.size != buf.new.size;
        if changed {
            self.changed.insert(key.clone());
        }
        changed
    }

    pub fn get(&self, key: &K) -> Option<DoubleBuffer<Measurement>> {
        self.entries.get(key).copied()
    }

    pub fn sizes(&self, key: &K) -> DoubleBuffer<Size> {
        self.entries
            .get(key)
            .map(|b| b.map(|m| m.size))
            .unwrap_or_default()
    }

    pub fn child_counts(&self, key: &K) -> DoubleBuffer<usize> {
        self.entries
            .get(key)
            .map(|b| b.map(|m| m.child_count))
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn forget(&mut self, key: &K) {
        self.entries.remove(key);
        self.changed.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys whose size changed since the last [`SizeStore::clear_changed`].
    pub fn changed(&self) -> impl Iterator<Item = &K> {
        self.changed.iter()
    }

    pub fn is_changed(&self, key: &K) -> bool {
        self.changed.contains(key)
    }

    pub fn clear_changed(&mut self) {
        self.changed.clear();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.changed.clear();
    }
}
