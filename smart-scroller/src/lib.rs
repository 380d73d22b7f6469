//! A headless scroll-position stabilization and boundary-detection engine.
//!
//! For adapter-level utilities (a simulated host, a feed-pumping controller), see the
//! `smart-scroller-adapter` crate.
//!
//! The engine keeps a mutating, asynchronously-loading scroll container visually stable:
//! it follows new content at the bottom while the user is there, and otherwise preserves the
//! reading position when content shifts above or below the viewport. Alongside that it classifies
//! the scroll position against top/bottom boundaries and notifies observers.
//!
//! It is UI-agnostic. A TUI/GUI/DOM layer is expected to provide:
//! - a [`ScrollHost`]: scroll metrics, element rectangles, a writable scroll offset
//! - a [`ChangeFeed`]: content-mutation, resize, media-load and scroll notifications
//! - a clock, passed as `now_ms` to [`SmartScroller::pump`] / [`SmartScroller::tick`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod boundary;
mod buffer;
mod dispatcher;
mod error;
mod events;
mod feed;
mod filter;
mod geometry;
mod host;
mod key;
mod media;
mod options;
mod policy;
mod scroller;
mod size;
mod state;
mod types;
mod visibility;

#[cfg(test)]
mod tests;

pub use boundary::{BOTTOM_TOLERANCE, classify};
pub use buffer::DoubleBuffer;
pub use error::{Error, Result};
pub use events::{EventHandler, EventKind, HandlerId, ScrollEvent, ScrollReport};
pub use feed::{
    AttributeFilter, ChangeFeed, Interest, MutationBatch, MutationRecord, Notification,
    QueueFeed, ResizeBatch, ResizeEntry,
};
pub use filter::{
    CorrectionFilter, FilterId, FilterInput, FilterPipeline, MergeRule, simple_on_height,
};
pub use geometry::{Rect, Relation, contains, intersection, intersects, relation};
pub use host::{Element, ScrollHost};
pub use media::{DEFAULT_MEDIA_TAGS, MediaCoordinator};
pub use options::{ElementSelector, ScrollerOptions};
pub use policy::{Decision, PolicyInput, decide};
pub use scroller::{DestroyHandle, SmartScroller};
pub use size::{Measurement, SizeStore};
pub use state::ScrollerState;
pub use types::{BoundaryState, BoundaryStatus, ScrollMetrics, Size};
pub use visibility::VisibilityStore;

#[doc(hidden)]
pub use key::ElementKey;
