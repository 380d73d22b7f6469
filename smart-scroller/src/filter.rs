use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{DoubleBuffer, Element, Error, Result, Size};

/// Identifies a registered [`CorrectionFilter`] for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterId(pub u64);

/// What a filter sees for one changed element.
#[derive(Debug)]
pub struct FilterInput<'a, K> {
    pub element: Element<'a, K>,
    /// Content box at the previous and the latest resize observation.
    pub size: DoubleBuffer<Size>,
    /// Child count at the previous and the latest resize observation.
    pub child_count: DoubleBuffer<usize>,
}

/// Translates one element's measured delta into a scroll compensation.
///
/// Returning `None` means "no opinion". Returned values must be finite.
pub type CorrectionFilter<K> = Arc<dyn Fn(&FilterInput<'_, K>) -> Option<Size> + Send + Sync>;

/// How several filters' results for the *same* element combine.
///
/// Results for different elements are always summed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeRule {
    /// The last filter (in registration order) with an opinion decides.
    #[default]
    LastWins,
    /// The first filter with an opinion decides.
    FirstWins,
    /// All opinions are added up.
    Sum,
}

/// An ordered list of correction filters.
pub struct FilterPipeline<K> {
    filters: Vec<(FilterId, CorrectionFilter<K>)>,
    next_id: u64,
    merge_rule: MergeRule,
}

impl<K> Default for FilterPipeline<K> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            next_id: 0,
            merge_rule: MergeRule::default(),
        }
    }
}

impl<K> FilterPipeline<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge_rule(mut self, merge_rule: MergeRule) -> Self {
        self.merge_rule = merge_rule;
        self
    }

    pub fn merge_rule(&self) -> MergeRule {
        self.merge_rule
    }

    pub fn set_merge_rule(&mut self, merge_rule: MergeRule) {
        self.merge_rule = merge_rule;
    }

    /// Appends `filter`. Earlier filters stay registered.
    pub fn register(&mut self, filter: CorrectionFilter<K>) -> FilterId {
        let id = FilterId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.filters.push((id, filter));
        ssdebug!(id = id.0, total = self.filters.len(), "FilterPipeline::register");
        id
    }

    pub fn unregister(&mut self, id: FilterId) -> bool {
        let before = self.filters.len();
        self.filters.retain(|(fid, _)| *fid != id);
        self.filters.len() != before
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Runs every filter for one element and merges their opinions per [`MergeRule`].
    pub fn evaluate(&self, input: &FilterInput<'_, K>) -> Result<Option<Size>> {
        let mut merged: Option<Size> = None;
        for (id, filter) in &self.filters {
            let Some(delta) = filter(input) else {
                continue;
            };
            if !delta.is_finite() {
                sswarn!(filter = id.0, "correction filter returned a non-finite delta");
                return Err(Error::MalformedCorrection {
                    filter: *id,
                    height: delta.height,
                    width: delta.width,
                });
            }
            merged = Some(match (self.merge_rule, merged) {
                (_, None) => delta,
                (MergeRule::LastWins, Some(_)) => delta,
                (MergeRule::FirstWins, Some(prev)) => prev,
                (MergeRule::Sum, Some(prev)) => prev + delta,
            });
        }
        Ok(merged)
    }

    /// Evaluates every input and sums the per-element results.
    ///
    /// Returns `None` when no filter expressed an opinion for any element.
    pub fn run<'a>(
        &self,
        inputs: impl IntoIterator<Item = FilterInput<'a, K>>,
    ) -> Result<Option<Size>>
    where
        K: 'a,
    {
        let mut total: Option<Size> = None;
        for input in inputs {
            if let Some(delta) = self.evaluate(&input)? {
                *total.get_or_insert(Size::ZERO) += delta;
            }
        }
        Ok(total)
    }
}

impl<K> core::fmt::Debug for FilterPipeline<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.filters.len())
            .field("merge_rule", &self.merge_rule)
            .finish_non_exhaustive()
    }
}

/// Builds a filter that reports an element's height delta, or no opinion when the height did
/// not change.
///
/// It only fires when the element's child count is unchanged between observations, so a layout
/// snapshot taken mid-restructure is never trusted. When `tags` is non-empty the filter is
/// further restricted to those element kinds (ASCII case-insensitive).
pub fn simple_on_height<K, I, S>(tags: I) -> CorrectionFilter<K>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
    Arc::new(move |input: &FilterInput<'_, K>| {
        if input.child_count.changed() {
            return None;
        }
        if !tags.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(input.element.tag)) {
            return None;
        }
        let delta = input.size.new.height - input.size.old.height;
        (delta != 0.0).then(|| Size::new(delta, 0.0))
    })
}
