use crate::{BoundaryState, ScrollMetrics};

/// A lightweight, serializable snapshot of the engine's scroll classification.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerState {
    /// Metrics of the last settled scroll burst or correction pass.
    pub metrics: ScrollMetrics,
    /// Classification at the last debounce fire.
    pub boundary: BoundaryState,
    pub paused: bool,
    pub last_known_scroll_bottom_offset: f64,
    pub extra_scroll_boundary: f64,
    pub destroyed: bool,
}
