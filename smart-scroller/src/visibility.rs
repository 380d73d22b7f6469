use crate::key::{ElementKey, KeyMap, KeySet};
use crate::{DoubleBuffer, ElementSelector, Relation, ScrollHost, relation};

/// Double-buffered "is this element within the host's bounds" record.
///
/// Entries are keyed by element identity. Elements that leave the host are dropped through
/// [`VisibilityStore::forget`], which the engine calls for every removed node of a mutation batch.
#[derive(Clone, Debug)]
pub struct VisibilityStore<K> {
    records: KeyMap<K, DoubleBuffer<bool>>,
    changed: KeySet<K>,
}

impl<K> Default for VisibilityStore<K> {
    fn default() -> Self {
        Self {
            records: KeyMap::default(),
            changed: KeySet::default(),
        }
    }
}

impl<K: ElementKey> VisibilityStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes visibility for every element the host reports (restricted by `selector`).
    ///
    /// Returns the number of visited elements.
    pub fn refresh<H: ScrollHost<K> + ?Sized>(
        &mut self,
        host: &H,
        selector: &ElementSelector<K>,
    ) -> usize {
        let bounds = host.bounds();
        let mut visited = 0usize;
        host.for_each_element(&mut |el| {
            if !selector.matches(&el) {
                return;
            }
            visited += 1;
            let visible = !matches!(relation(&el.rect, &bounds), Relation::Disjoint);
            self.record(el.key, visible);
        });
        sstrace!(visited, tracked = self.records.len(), "VisibilityStore::refresh");
        visited
    }

    /// Writes one observation for `key`. Elements seen for the first time start with
    /// `old == false`.
    pub fn record(&mut self, key: &K, visible: bool) {
        let changed = match self.records.get_mut(key) {
            Some(buf) => {
                buf.push(visible);
                buf.changed()
            }
            None => {
                self.records
                    .insert(key.clone(), DoubleBuffer::first(false, visible));
                visible
            }
        };
        if changed {
            self.changed.insert(key.clone());
        }
    }

    pub fn get(&self, key: &K) -> Option<DoubleBuffer<bool>> {
        self.records.get(key).copied()
    }

    /// Latest observation for `key`; `false` for elements never observed.
    pub fn is_visible(&self, key: &K) -> bool {
        self.records.get(key).is_some_and(|b| b.new)
    }

    /// Whether `key` was visible in either of its last two observations.
    pub fn was_or_is_visible(&self, key: &K) -> bool {
        self.records.get(key).is_some_and(|b| b.old || b.new)
    }

    pub fn forget(&mut self, key: &K) {
        self.records.remove(key);
        self.changed.remove(key);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &DoubleBuffer<bool>)> {
        self.records.iter()
    }

    /// Keys whose visibility flipped since the last [`VisibilityStore::clear_changed`].
    pub fn changed(&self) -> impl Iterator<Item = &K> {
        self.changed.iter()
    }

    pub fn clear_changed(&mut self) {
        self.changed.clear();
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.changed.clear();
    }
}
