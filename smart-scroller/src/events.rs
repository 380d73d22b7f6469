use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{BoundaryStatus, ScrollMetrics, VisibilityStore};

/// Discriminant of [`ScrollEvent`], used to subscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    ScrollBoundary,
    ExtraScrollBoundary,
    AutoScroll,
    ScrollPause,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        Self::ScrollBoundary,
        Self::ExtraScrollBoundary,
        Self::AutoScroll,
        Self::ScrollPause,
    ];

    fn slot(self) -> usize {
        match self {
            Self::ScrollBoundary => 0,
            Self::ExtraScrollBoundary => 1,
            Self::AutoScroll => 2,
            Self::ScrollPause => 3,
        }
    }
}

/// Metrics plus the visibility table at the moment an event fired.
#[derive(Debug)]
pub struct ScrollReport<'a, K> {
    pub metrics: ScrollMetrics,
    pub visibility: &'a VisibilityStore<K>,
}

impl<K> Clone for ScrollReport<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ScrollReport<'_, K> {}

/// Events emitted once per settled scroll burst.
#[derive(Debug)]
pub enum ScrollEvent<'a, K> {
    /// Strict top/bottom classification.
    ScrollBoundary {
        status: Option<BoundaryStatus>,
        report: ScrollReport<'a, K>,
    },
    /// Classification against the widened (custom) boundaries.
    ExtraScrollBoundary {
        status: Option<BoundaryStatus>,
        report: ScrollReport<'a, K>,
    },
    /// The user is at the bottom with auto-scroll on: the engine is following the tail.
    AutoScroll(ScrollReport<'a, K>),
    /// Auto-following is suspended.
    ScrollPause(ScrollReport<'a, K>),
}

impl<K> ScrollEvent<'_, K> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ScrollBoundary { .. } => EventKind::ScrollBoundary,
            Self::ExtraScrollBoundary { .. } => EventKind::ExtraScrollBoundary,
            Self::AutoScroll(_) => EventKind::AutoScroll,
            Self::ScrollPause(_) => EventKind::ScrollPause,
        }
    }

    pub fn report(&self) -> &ScrollReport<'_, K> {
        match self {
            Self::ScrollBoundary { report, .. }
            | Self::ExtraScrollBoundary { report, .. }
            | Self::AutoScroll(report)
            | Self::ScrollPause(report) => report,
        }
    }

    pub fn status(&self) -> Option<BoundaryStatus> {
        match self {
            Self::ScrollBoundary { status, .. } | Self::ExtraScrollBoundary { status, .. } => {
                *status
            }
            Self::AutoScroll(_) | Self::ScrollPause(_) => None,
        }
    }
}

pub type EventHandler<K> = Arc<dyn Fn(&ScrollEvent<'_, K>) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandlerId(pub u64);

/// Per-kind ordered handler lists.
pub(crate) struct Handlers<K> {
    slots: [Vec<(HandlerId, EventHandler<K>)>; 4],
    next_id: u64,
}

impl<K> Default for Handlers<K> {
    fn default() -> Self {
        Self {
            slots: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            next_id: 0,
        }
    }
}

impl<K> Handlers<K> {
    pub(crate) fn add(&mut self, kind: EventKind, handler: EventHandler<K>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.slots[kind.slot()].push((id, handler));
        id
    }

    pub(crate) fn remove(&mut self, id: HandlerId) -> bool {
        for slot in &mut self.slots {
            if let Some(pos) = slot.iter().position(|(hid, _)| *hid == id) {
                slot.remove(pos);
                return true;
            }
        }
        false
    }

    pub(crate) fn len(&self, kind: EventKind) -> usize {
        self.slots[kind.slot()].len()
    }

    /// Delivers `event` in registration order; stops as soon as `keep_going` turns false.
    pub(crate) fn emit(&self, event: &ScrollEvent<'_, K>, keep_going: impl Fn() -> bool) {
        for (_, handler) in &self.slots[event.kind().slot()] {
            if !keep_going() {
                return;
            }
            handler(event);
        }
    }

    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }
}
