use crate::{BoundaryState, ScrollMetrics};

/// Trailing debounce over raw scroll ticks.
///
/// Every tick re-arms the deadline (it is replaced, never extended by accumulation). The engine
/// polls [`Dispatcher::due`] from its clock-driven `tick` and, when it fires, classifies the
/// position once for the whole burst.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Dispatcher {
    deadline_ms: Option<u64>,
    paused: bool,
    last_known_bottom_offset: f64,
    last_boundary: BoundaryState,
}

impl Dispatcher {
    pub(crate) fn new(metrics: &ScrollMetrics, boundary: BoundaryState, auto: bool) -> Self {
        let mut d = Self::default();
        d.settle(metrics, boundary, auto);
        d
    }

    pub(crate) fn arm(&mut self, now_ms: u64, debounce_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(debounce_ms));
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub(crate) fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Consumes the deadline when it has passed.
    pub(crate) fn due(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub(crate) fn settle(&mut self, metrics: &ScrollMetrics, boundary: BoundaryState, auto: bool) {
        self.paused = !(auto && boundary.at_bottom);
        self.last_known_bottom_offset = metrics.bottom_offset();
        self.last_boundary = boundary;
    }

    pub(crate) fn paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn last_known_bottom_offset(&self) -> f64 {
        self.last_known_bottom_offset
    }

    pub(crate) fn last_boundary(&self) -> BoundaryState {
        self.last_boundary
    }
}
