//! The decision core: where the viewport goes after the content changed.

use crate::{BoundaryState, Result, ScrollMetrics, Size};

/// Everything the policy needs for one correction pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyInput {
    /// Metrics recorded before the change (the user's position).
    pub prev: ScrollMetrics,
    /// Metrics after the host re-laid out the changed content.
    pub next: ScrollMetrics,
    /// Classification of `prev`.
    pub boundary: BoundaryState,
    /// The dispatcher's paused flag.
    pub paused: bool,
    pub auto_scroll_bottom: bool,
    pub preserve_scroll_on_layout_shift: bool,
}

/// Outcome of a correction pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// Mid-scroll compensation for content that shifted around the reading position.
    Compensate { offset: f64, horizontal_advance: f64 },
    /// Follow the tail.
    PinBottom { offset: f64 },
    /// Keep the distance from the bottom.
    AnchorBottom { offset: f64 },
    /// Leave the viewport where it is.
    Keep,
}

impl Decision {
    pub fn offset(&self) -> Option<f64> {
        match *self {
            Self::Compensate { offset, .. }
            | Self::PinBottom { offset }
            | Self::AnchorBottom { offset } => Some(offset),
            Self::Keep => None,
        }
    }
}

/// Picks the correction for a pass. The first matching branch wins:
///
/// 1. auto-scroll and shift preservation on, user neither at top nor bottom: compensate. The
///    filter pipeline (`compensate`) is only consulted here. A non-zero compensation height
///    moves the offset to `prev + compensation.height`; otherwise (no opinion, or a zero height)
///    it moves by the extent delta. A positive compensation width advances horizontally.
/// 2. not paused and auto-scroll on: pin to the new bottom.
/// 3. auto-scroll off and not at bottom: keep the distance from the bottom.
///
/// Otherwise the viewport stays put. All offsets are clamped to the new scrollable range.
pub fn decide(
    input: &PolicyInput,
    compensate: impl FnOnce() -> Result<Option<Size>>,
) -> Result<Decision> {
    let PolicyInput {
        prev,
        next,
        boundary,
        paused,
        auto_scroll_bottom,
        preserve_scroll_on_layout_shift,
    } = *input;

    if auto_scroll_bottom
        && preserve_scroll_on_layout_shift
        && !boundary.at_bottom
        && !boundary.at_top
    {
        let compensation = compensate()?.unwrap_or_default();
        let offset = if compensation.height != 0.0 {
            prev.scroll_offset + compensation.height
        } else {
            prev.scroll_offset + (next.scroll_extent - prev.scroll_extent)
        };
        let horizontal_advance = compensation.width.max(0.0);
        return Ok(Decision::Compensate {
            offset: next.clamp_scroll_offset(offset),
            horizontal_advance,
        });
    }

    if !paused && auto_scroll_bottom {
        return Ok(Decision::PinBottom {
            offset: next.max_scroll_offset(),
        });
    }

    if !auto_scroll_bottom && !boundary.at_bottom {
        let offset = next.scroll_extent - next.viewport_extent - prev.bottom_offset();
        return Ok(Decision::AnchorBottom {
            offset: next.clamp_scroll_offset(offset),
        });
    }

    Ok(Decision::Keep)
}
