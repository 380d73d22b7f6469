use crate::{Rect, ScrollMetrics};

/// A read-only view of one tracked descendant of the scroll host.
#[derive(Debug)]
pub struct Element<'a, K> {
    pub key: &'a K,
    /// Lower- or upper-case tag/kind name (`"img"`, `"p"`, `"Row"` ...).
    pub tag: &'a str,
    /// Border box in the same coordinate space as [`ScrollHost::bounds`].
    pub rect: Rect,
    pub child_count: usize,
    /// For media-like elements: whether the intrinsic size has resolved. Always `true` otherwise.
    pub complete: bool,
}

impl<K> Clone for Element<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Element<'_, K> {}

/// The scroll container the engine stabilizes.
///
/// This is the only way the engine observes layout or writes a scroll position; it never holds
/// UI objects of its own. Implementations are expected to answer from the host's current layout.
pub trait ScrollHost<K> {
    fn metrics(&self) -> ScrollMetrics;

    /// Visible bounds of the container, in the coordinate space element rects are reported in.
    fn bounds(&self) -> Rect;

    fn set_scroll_offset(&mut self, offset: f64);

    fn scroll_left(&self) -> f64 {
        0.0
    }

    fn set_scroll_left(&mut self, _left: f64) {}

    /// Visits the tracked descendants in document order.
    fn for_each_element(&self, f: &mut dyn FnMut(Element<'_, K>));

    fn element(&self, key: &K) -> Option<Element<'_, K>>;
}
