//! Axis-aligned rectangle relationships.
//!
//! These are pure functions; the engine only uses them to decide whether a tracked element lies
//! within the host's visible bounds.

/// An axis-aligned rectangle in layout units. `y` grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// How one rectangle relates to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// No shared area. Rectangles that only touch along an edge are disjoint.
    Disjoint,
    /// Some shared area, neither contains the other.
    Overlaps,
    /// The first rectangle lies fully within the second.
    Inside,
    /// The first rectangle covers the second and extends past it.
    Encloses,
}

/// Returns `true` when `inner` lies fully within `outer` (shared edges allowed).
pub fn contains(outer: &Rect, inner: &Rect) -> bool {
    inner.x >= outer.x
        && inner.y >= outer.y
        && inner.right() <= outer.right()
        && inner.bottom() <= outer.bottom()
}

/// Returns `true` when `a` and `b` share a positive area.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

pub fn intersection(a: &Rect, b: &Rect) -> Option<Rect> {
    if !intersects(a, b) {
        return None;
    }
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    Some(Rect::new(x, y, right - x, bottom - y))
}

/// Classifies `rect` relative to `reference`.
///
/// A zero-sized `rect` sitting on or inside `reference` is reported as [`Relation::Inside`].
pub fn relation(rect: &Rect, reference: &Rect) -> Relation {
    if contains(reference, rect) {
        return Relation::Inside;
    }
    if contains(rect, reference) {
        return Relation::Encloses;
    }
    if intersects(rect, reference) {
        Relation::Overlaps
    } else {
        Relation::Disjoint
    }
}
