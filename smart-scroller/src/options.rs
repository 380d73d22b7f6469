use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::media::DEFAULT_MEDIA_TAGS;
use crate::{AttributeFilter, Element, Error, Interest, Result};

/// A predicate over host elements.
pub type ElementPredicate<K> = Arc<dyn Fn(&Element<'_, K>) -> bool + Send + Sync>;

/// Restricts which descendants are tracked for size and visibility.
pub enum ElementSelector<K> {
    /// Every element the host reports.
    All,
    /// Elements whose tag matches one of the names (ASCII case-insensitive).
    Tags(Vec<String>),
    Predicate(ElementPredicate<K>),
}

impl<K> ElementSelector<K> {
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tags(tags.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&Element<'_, K>) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, element: &Element<'_, K>) -> bool {
        match self {
            Self::All => true,
            Self::Tags(tags) => tags.iter().any(|t| t.eq_ignore_ascii_case(element.tag)),
            Self::Predicate(f) => f(element),
        }
    }
}

impl<K> Clone for ElementSelector<K> {
    fn clone(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Tags(tags) => Self::Tags(tags.clone()),
            Self::Predicate(f) => Self::Predicate(Arc::clone(f)),
        }
    }
}

impl<K> Default for ElementSelector<K> {
    fn default() -> Self {
        Self::All
    }
}

impl<K> core::fmt::Debug for ElementSelector<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Tags(tags) => f.debug_tuple("Tags").field(tags).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Configuration for [`crate::SmartScroller`].
///
/// Values are checked by [`ScrollerOptions::validate`] when the engine is constructed; a bad value
/// is a construction error rather than something silently coerced.
pub struct ScrollerOptions<K> {
    /// Margin (layout units) for the custom top/bottom classification.
    pub extra_scroll_boundary: f64,

    /// Keep the viewport pinned to the bottom while the user is there.
    pub auto_scroll_bottom: bool,

    /// Subscribe to mutation and resize notifications. When `false` the engine only reacts to
    /// raw scroll ticks.
    pub observe_mutations: bool,

    /// Compensate layout shifts while the user is scrolled somewhere in the middle.
    pub preserve_scroll_on_layout_shift: bool,

    /// Trailing-debounce window for scroll classification, in milliseconds.
    pub debounce_time_ms: u64,

    /// Which descendants are tracked for size/visibility.
    pub query_selector: ElementSelector<K>,

    /// Which attribute mutations trigger a correction pass. Empty means all attributes.
    pub attribute_filter: AttributeFilter,

    /// Element kinds whose intrinsic size resolves late (media).
    pub media_tags: Vec<String>,
}

impl<K> Clone for ScrollerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            extra_scroll_boundary: self.extra_scroll_boundary,
            auto_scroll_bottom: self.auto_scroll_bottom,
            observe_mutations: self.observe_mutations,
            preserve_scroll_on_layout_shift: self.preserve_scroll_on_layout_shift,
            debounce_time_ms: self.debounce_time_ms,
            query_selector: self.query_selector.clone(),
            attribute_filter: self.attribute_filter.clone(),
            media_tags: self.media_tags.clone(),
        }
    }
}

impl<K> Default for ScrollerOptions<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ScrollerOptions<K> {
    pub fn new() -> Self {
        Self {
            extra_scroll_boundary: 0.0,
            auto_scroll_bottom: true,
            observe_mutations: true,
            preserve_scroll_on_layout_shift: true,
            debounce_time_ms: 100,
            query_selector: ElementSelector::All,
            attribute_filter: AttributeFilter::default(),
            media_tags: DEFAULT_MEDIA_TAGS.iter().map(|t| String::from(*t)).collect(),
        }
    }

    pub fn with_extra_scroll_boundary(mut self, extra_scroll_boundary: f64) -> Self {
        self.extra_scroll_boundary = extra_scroll_boundary;
        self
    }

    pub fn with_auto_scroll_bottom(mut self, auto_scroll_bottom: bool) -> Self {
        self.auto_scroll_bottom = auto_scroll_bottom;
        self
    }

    pub fn with_observe_mutations(mut self, observe_mutations: bool) -> Self {
        self.observe_mutations = observe_mutations;
        self
    }

    pub fn with_preserve_scroll_on_layout_shift(mut self, preserve: bool) -> Self {
        self.preserve_scroll_on_layout_shift = preserve;
        self
    }

    pub fn with_debounce_time_ms(mut self, debounce_time_ms: u64) -> Self {
        self.debounce_time_ms = debounce_time_ms;
        self
    }

    pub fn with_query_selector(mut self, query_selector: ElementSelector<K>) -> Self {
        self.query_selector = query_selector;
        self
    }

    pub fn with_attribute_filter(mut self, attribute_filter: AttributeFilter) -> Self {
        self.attribute_filter = attribute_filter;
        self
    }

    pub fn with_media_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.extra_scroll_boundary.is_finite() {
            return Err(Error::InvalidOption {
                option: "extra_scroll_boundary",
                reason: "must be finite",
            });
        }
        if self.extra_scroll_boundary < 0.0 {
            return Err(Error::InvalidOption {
                option: "extra_scroll_boundary",
                reason: "must not be negative",
            });
        }
        if let ElementSelector::Tags(tags) = &self.query_selector {
            if tags.is_empty() {
                return Err(Error::InvalidOption {
                    option: "query_selector",
                    reason: "tag list must not be empty",
                });
            }
            if tags.iter().any(|t| !is_name(t)) {
                return Err(Error::InvalidOption {
                    option: "query_selector",
                    reason: "tag names must be non-empty and contain no whitespace",
                });
            }
        }
        if self.attribute_filter.names().iter().any(|n| !is_name(n)) {
            return Err(Error::InvalidOption {
                option: "attribute_filter",
                reason: "attribute names must be non-empty and contain no whitespace",
            });
        }
        if self.media_tags.iter().any(|t| !is_name(t)) {
            return Err(Error::InvalidOption {
                option: "media_tags",
                reason: "tag names must be non-empty and contain no whitespace",
            });
        }
        Ok(())
    }

    pub(crate) fn interest(&self) -> Interest {
        Interest {
            mutations: self.observe_mutations,
            resize: self.observe_mutations,
            scroll: true,
            attribute_filter: self.attribute_filter.clone(),
        }
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

impl<K> core::fmt::Debug for ScrollerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("extra_scroll_boundary", &self.extra_scroll_boundary)
            .field("auto_scroll_bottom", &self.auto_scroll_bottom)
            .field("observe_mutations", &self.observe_mutations)
            .field(
                "preserve_scroll_on_layout_shift",
                &self.preserve_scroll_on_layout_shift,
            )
            .field("debounce_time_ms", &self.debounce_time_ms)
            .field("query_selector", &self.query_selector)
            .field("attribute_filter", &self.attribute_filter)
            .field("media_tags", &self.media_tags)
            .finish()
    }
}
