use alloc::string::String;
use alloc::vec::Vec;

use crate::key::{ElementKey, KeySet};
use crate::{ChangeFeed, Element};

/// Element kinds whose intrinsic size may resolve after they are inserted.
pub const DEFAULT_MEDIA_TAGS: [&str; 3] = ["img", "iframe", "video"];

/// Tracks media elements that have not finished loading.
///
/// Each pending element holds exactly one load watch in the feed; a completion consumes it.
#[derive(Clone, Debug)]
pub struct MediaCoordinator<K> {
    tags: Vec<String>,
    pending: KeySet<K>,
}

impl<K: ElementKey> MediaCoordinator<K> {
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            tags,
            pending: KeySet::default(),
        }
    }

    pub fn is_media(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Registers a one-shot load watch for `element` if it is media that is still loading.
    ///
    /// Returns `true` when a watch was registered.
    pub fn observe<F: ChangeFeed<K> + ?Sized>(&mut self, element: &Element<'_, K>, feed: &mut F) -> bool {
        if element.complete || !self.is_media(element.tag) {
            return false;
        }
        if !self.pending.insert(element.key.clone()) {
            return false;
        }
        feed.watch_load(element.key);
        sstrace!(pending = self.pending.len(), "MediaCoordinator::observe");
        true
    }

    /// Consumes the pending entry for `key`. Returns `false` for keys that were not pending.
    pub fn complete(&mut self, key: &K) -> bool {
        self.pending.remove(key)
    }

    pub fn forget<F: ChangeFeed<K> + ?Sized>(&mut self, key: &K, feed: &mut F) {
        if self.pending.remove(key) {
            feed.unwatch_load(key);
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains(key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
