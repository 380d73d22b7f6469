/// A content-box size in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub height: f64,
    pub width: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        height: 0.0,
        width: 0.0,
    };

    pub fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }

    pub fn is_finite(&self) -> bool {
        self.height.is_finite() && self.width.is_finite()
    }
}

impl core::ops::Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        Size {
            height: self.height + rhs.height,
            width: self.width + rhs.width,
        }
    }
}

impl core::ops::AddAssign for Size {
    fn add_assign(&mut self, rhs: Size) {
        self.height += rhs.height;
        self.width += rhs.width;
    }
}

/// Scroll geometry of the host along the vertical axis.
///
/// `scroll_offset` is the distance scrolled from the top, `scroll_extent` the full content
/// height and `viewport_extent` the visible height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub scroll_offset: f64,
    pub scroll_extent: f64,
    pub viewport_extent: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_offset: f64, scroll_extent: f64, viewport_extent: f64) -> Self {
        Self {
            scroll_offset,
            scroll_extent,
            viewport_extent,
        }
    }

    /// Largest reachable scroll offset (never negative).
    pub fn max_scroll_offset(&self) -> f64 {
        let max = self.scroll_extent - self.viewport_extent;
        if max > 0.0 { max } else { 0.0 }
    }

    /// Distance between the bottom of the viewport and the end of the content.
    pub fn bottom_offset(&self) -> f64 {
        self.scroll_extent - self.scroll_offset - self.viewport_extent
    }

    pub fn clamp_scroll_offset(&self, offset: f64) -> f64 {
        let max = self.max_scroll_offset();
        if offset < 0.0 {
            0.0
        } else if offset > max {
            max
        } else {
            offset
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.scroll_offset.is_finite()
            && self.scroll_extent.is_finite()
            && self.viewport_extent.is_finite()
            && self.scroll_extent >= 0.0
            && self.viewport_extent >= 0.0
    }
}

/// Composite classification of a scroll position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryStatus {
    Top,
    Bottom,
    /// Both boundaries hold: the content fits without scrolling.
    All,
}

impl BoundaryStatus {
    pub fn from_flags(at_top: bool, at_bottom: bool) -> Option<Self> {
        match (at_top, at_bottom) {
            (true, true) => Some(Self::All),
            (true, false) => Some(Self::Top),
            (false, true) => Some(Self::Bottom),
            (false, false) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryState {
    pub at_top: bool,
    pub at_bottom: bool,
    pub at_custom_top: bool,
    pub at_custom_bottom: bool,
}

impl BoundaryState {
    pub fn status(&self) -> Option<BoundaryStatus> {
        BoundaryStatus::from_flags(self.at_top, self.at_bottom)
    }

    pub fn custom_status(&self) -> Option<BoundaryStatus> {
        BoundaryStatus::from_flags(self.at_custom_top, self.at_custom_bottom)
    }
}
