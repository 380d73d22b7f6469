//! The boundary between the engine and the host's notification machinery.
//!
//! Hosts deliver content mutations, per-element resizes, media load completions and raw scroll
//! ticks in their own way (observer callbacks, frame diffs, widget events). A [`ChangeFeed`]
//! normalizes those into [`Notification`] batches the engine drains on its own schedule.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::Size;
use crate::key::{ElementKey, KeySet};

/// Attribute names whose mutation triggers a correction pass.
///
/// A trailing `*` makes the entry a prefix pattern (`data-*`). An empty filter matches every
/// attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeFilter {
    names: Vec<String>,
}

impl AttributeFilter {
    pub const DEFAULT_NAMES: [&'static str; 6] = ["class", "style", "src", "data-*", "height", "width"];

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that lets every attribute through.
    pub fn all() -> Self {
        Self { names: Vec::new() }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn matches(&self, attribute: &str) -> bool {
        if self.names.is_empty() {
            return true;
        }
        self.names.iter().any(|name| match name.strip_suffix('*') {
            Some(prefix) => attribute.starts_with(prefix),
            None => name == attribute,
        })
    }
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMES)
    }
}

/// A single content-mutation record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationRecord<K> {
    ChildList { added: Vec<K>, removed: Vec<K> },
    Attribute { target: K, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationBatch<K> {
    pub records: Vec<MutationRecord<K>>,
}

impl<K> MutationBatch<K> {
    pub fn new(records: Vec<MutationRecord<K>>) -> Self {
        Self { records }
    }

    pub fn added(added: Vec<K>) -> Self {
        Self::new(alloc::vec![MutationRecord::ChildList {
            added,
            removed: Vec::new(),
        }])
    }

    pub fn removed(removed: Vec<K>) -> Self {
        Self::new(alloc::vec![MutationRecord::ChildList {
            added: Vec::new(),
            removed,
        }])
    }

    pub fn attribute(target: K, name: impl Into<String>) -> Self {
        Self::new(alloc::vec![MutationRecord::Attribute {
            target,
            name: name.into(),
        }])
    }

    /// Whether any record warrants a correction pass under `filter`.
    ///
    /// Child-list records are always relevant.
    pub fn is_relevant(&self, filter: &AttributeFilter) -> bool {
        self.records.iter().any(|r| match r {
            MutationRecord::ChildList { added, removed } => {
                !added.is_empty() || !removed.is_empty()
            }
            MutationRecord::Attribute { name, .. } => filter.matches(name),
        })
    }

    pub fn for_each_added(&self, mut f: impl FnMut(&K)) {
        for r in &self.records {
            if let MutationRecord::ChildList { added, .. } = r {
                added.iter().for_each(&mut f);
            }
        }
    }

    pub fn for_each_removed(&self, mut f: impl FnMut(&K)) {
        for r in &self.records {
            if let MutationRecord::ChildList { removed, .. } = r {
                removed.iter().for_each(&mut f);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeEntry<K> {
    pub key: K,
    pub size: Size,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeBatch<K> {
    pub entries: Vec<ResizeEntry<K>>,
}

impl<K> ResizeBatch<K> {
    pub fn new(entries: Vec<ResizeEntry<K>>) -> Self {
        Self { entries }
    }

    pub fn single(key: K, size: Size) -> Self {
        Self::new(alloc::vec![ResizeEntry { key, size }])
    }
}

/// A normalized notification from the host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notification<K> {
    Mutation(MutationBatch<K>),
    Resize(ResizeBatch<K>),
    /// A media-like element finished loading.
    Loaded(K),
    Scroll,
}

/// What a subscriber wants to hear about.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interest {
    pub mutations: bool,
    pub resize: bool,
    pub scroll: bool,
    pub attribute_filter: AttributeFilter,
}

impl Interest {
    pub fn scroll_only() -> Self {
        Self {
            mutations: false,
            resize: false,
            scroll: true,
            attribute_filter: AttributeFilter::default(),
        }
    }

    pub fn admits<K>(&self, notification: &Notification<K>) -> bool {
        match notification {
            Notification::Mutation(batch) => {
                self.mutations && batch.is_relevant(&self.attribute_filter)
            }
            Notification::Resize(_) => self.resize,
            Notification::Scroll => self.scroll,
            Notification::Loaded(_) => true,
        }
    }
}

impl Default for Interest {
    fn default() -> Self {
        Self {
            mutations: true,
            resize: true,
            scroll: true,
            attribute_filter: AttributeFilter::default(),
        }
    }
}

/// Source of host notifications.
///
/// The engine subscribes once at construction, registers one-shot load watches for pending media,
/// and drains the feed from [`crate::SmartScroller::pump`]. It never assumes a delivery order
/// between kinds of notifications.
pub trait ChangeFeed<K> {
    fn subscribe(&mut self, interest: &Interest);

    fn unsubscribe(&mut self);

    /// Requests a single [`Notification::Loaded`] for `key` once it completes.
    fn watch_load(&mut self, key: &K);

    fn unwatch_load(&mut self, key: &K);

    /// Hands every queued notification to `sink`, oldest first.
    fn drain(&mut self, sink: &mut dyn FnMut(Notification<K>));
}

/// An in-memory [`ChangeFeed`]: adapters (and tests) push notifications, the engine drains them.
///
/// Notifications outside the current [`Interest`] are dropped at push time, load completions are
/// delivered only for watched keys and only once, and nothing is queued while unsubscribed.
#[derive(Clone, Debug)]
pub struct QueueFeed<K> {
    interest: Option<Interest>,
    queue: VecDeque<Notification<K>>,
    load_watches: KeySet<K>,
}

impl<K> Default for QueueFeed<K> {
    fn default() -> Self {
        Self {
            interest: None,
            queue: VecDeque::new(),
            load_watches: KeySet::default(),
        }
    }
}

impl<K: ElementKey> QueueFeed<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interest(&self) -> Option<&Interest> {
        self.interest.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.interest.is_some()
    }

    pub fn is_watching_load(&self, key: &K) -> bool {
        self.load_watches.contains(key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `notification`. Returns `false` when it was dropped.
    pub fn push(&mut self, notification: Notification<K>) -> bool {
        let Some(interest) = &self.interest else {
            return false;
        };
        if let Notification::Loaded(key) = &notification {
            if !self.load_watches.remove(key) {
                return false;
            }
        } else if !interest.admits(&notification) {
            return false;
        }
        self.queue.push_back(notification);
        true
    }

    pub fn push_mutation(&mut self, batch: MutationBatch<K>) -> bool {
        self.push(Notification::Mutation(batch))
    }

    pub fn push_resize(&mut self, batch: ResizeBatch<K>) -> bool {
        self.push(Notification::Resize(batch))
    }

    pub fn push_loaded(&mut self, key: K) -> bool {
        self.push(Notification::Loaded(key))
    }

    pub fn push_scroll(&mut self) -> bool {
        self.push(Notification::Scroll)
    }
}

impl<K: ElementKey> ChangeFeed<K> for QueueFeed<K> {
    fn subscribe(&mut self, interest: &Interest) {
        self.interest = Some(interest.clone());
    }

    fn unsubscribe(&mut self) {
        self.interest = None;
        self.queue.clear();
        self.load_watches.clear();
    }

    fn watch_load(&mut self, key: &K) {
        self.load_watches.insert(key.clone());
    }

    fn unwatch_load(&mut self, key: &K) {
        self.load_watches.remove(key);
    }

    fn drain(&mut self, sink: &mut dyn FnMut(Notification<K>)) {
        while let Some(n) = self.queue.pop_front() {
            sink(n);
        }
    }
}
