use crate::{BoundaryState, ScrollMetrics};

/// Slack applied to the bottom check; absorbs sub-pixel rounding in the host's layout.
pub const BOTTOM_TOLERANCE: f64 = 1.0;

/// Classifies `metrics` against the strict boundaries and against the custom boundaries widened
/// by `extra_boundary`.
///
/// This never fails: a container with no scrollable range is reported as being at both the top
/// and the bottom.
pub fn classify(metrics: &ScrollMetrics, extra_boundary: f64) -> BoundaryState {
    let offset = metrics.scroll_offset;
    let bottom_edge = offset + metrics.viewport_extent;
    let threshold = metrics.scroll_extent - BOTTOM_TOLERANCE;

    BoundaryState {
        at_top: offset <= 0.0,
        at_bottom: bottom_edge >= threshold,
        at_custom_top: offset <= extra_boundary,
        at_custom_bottom: bottom_edge >= threshold - extra_boundary,
    }
}
