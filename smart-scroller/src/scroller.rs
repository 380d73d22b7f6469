use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::dispatcher::Dispatcher;
use crate::events::Handlers;
use crate::key::{ElementKey, KeySet};
use crate::{
    BoundaryState, ChangeFeed, CorrectionFilter, Decision, Error, EventKind, FilterId,
    FilterInput, FilterPipeline, HandlerId, MediaCoordinator, MergeRule, MutationBatch,
    Notification, PolicyInput, ResizeBatch, Result, ScrollEvent, ScrollHost, ScrollMetrics,
    ScrollReport, ScrollerOptions, ScrollerState, Size, SizeStore, VisibilityStore, classify,
    decide, simple_on_height,
};

/// A cloneable teardown switch.
///
/// Event handlers cannot borrow the engine, so they capture one of these to request teardown from
/// inside a running callback. The engine stops emitting immediately and releases its resources
/// the next time it is touched.
#[derive(Clone, Debug, Default)]
pub struct DestroyHandle(Arc<AtomicBool>);

impl DestroyHandle {
    pub fn destroy(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The scroll stabilization engine.
///
/// This type is UI-agnostic:
/// - It reads layout and writes scroll offsets only through its [`ScrollHost`].
/// - It learns about changes only through its [`ChangeFeed`], drained by [`Self::pump`].
/// - It owns one timer (the scroll debounce), driven by the `now_ms` your adapter passes in.
///
/// Everything runs on the caller's thread. Once destroyed (via [`Self::destroy`] or a
/// [`DestroyHandle`]) every mutating call is a silent no-op.
pub struct SmartScroller<H, F, K> {
    host: H,
    feed: F,
    options: ScrollerOptions<K>,

    visibility: VisibilityStore<K>,
    sizes: SizeStore<K>,
    filters: FilterPipeline<K>,
    media: MediaCoordinator<K>,
    dispatcher: Dispatcher,
    handlers: Handlers<K>,

    // Metrics as of the last scroll tick or correction pass: the "before" side of the next pass.
    last_metrics: ScrollMetrics,

    destroyed: DestroyHandle,
    torn_down: bool,
}

impl<H, F, K> SmartScroller<H, F, K>
where
    H: ScrollHost<K>,
    F: ChangeFeed<K>,
    K: ElementKey,
{
    /// Creates an engine for `host`, subscribing to `feed` according to `options`.
    ///
    /// Fails when an option is out of range or the host reports unusable metrics.
    pub fn new(host: H, mut feed: F, options: ScrollerOptions<K>) -> Result<Self> {
        options.validate()?;
        let metrics = host.metrics();
        if !metrics.is_valid() {
            return Err(Error::InvalidHost {
                reason: "scroll metrics must be finite and non-negative",
            });
        }
        ssdebug!(
            auto_scroll_bottom = options.auto_scroll_bottom,
            observe_mutations = options.observe_mutations,
            debounce_time_ms = options.debounce_time_ms,
            "SmartScroller::new"
        );

        feed.subscribe(&options.interest());

        let boundary = classify(&metrics, options.extra_scroll_boundary);
        let mut visibility = VisibilityStore::new();
        visibility.refresh(&host, &options.query_selector);
        visibility.clear_changed();

        let mut media = MediaCoordinator::new(options.media_tags.clone());
        if options.observe_mutations {
            let selector = &options.query_selector;
            host.for_each_element(&mut |el| {
                if selector.matches(&el) {
                    media.observe(&el, &mut feed);
                }
            });
        }

        Ok(Self {
            dispatcher: Dispatcher::new(&metrics, boundary, options.auto_scroll_bottom),
            host,
            feed,
            visibility,
            sizes: SizeStore::new(),
            filters: FilterPipeline::new(),
            media,
            handlers: Handlers::default(),
            last_metrics: metrics,
            options,
            destroyed: DestroyHandle::default(),
            torn_down: false,
        })
    }

    pub fn options(&self) -> &ScrollerOptions<K> {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for adapters that apply layout changes themselves.
    ///
    /// Changes made here are only noticed through the feed.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }

    pub fn visibility(&self) -> &VisibilityStore<K> {
        &self.visibility
    }

    pub fn sizes(&self) -> &SizeStore<K> {
        &self.sizes
    }

    pub fn media(&self) -> &MediaCoordinator<K> {
        &self.media
    }

    pub fn filters(&self) -> &FilterPipeline<K> {
        &self.filters
    }

    /// Returns `false` once destroyed, tearing down on the first call after the flag was raised.
    fn alive(&mut self) -> bool {
        if !self.destroyed.is_destroyed() {
            return true;
        }
        if !self.torn_down {
            self.teardown();
        }
        false
    }

    fn teardown(&mut self) {
        ssdebug!(
            visibility = self.visibility.len(),
            sizes = self.sizes.len(),
            pending_media = self.media.pending_len(),
            "SmartScroller::teardown"
        );
        self.torn_down = true;
        self.feed.unsubscribe();
        self.dispatcher.cancel();
        self.visibility.clear();
        self.sizes.clear();
        self.media.clear();
        self.filters.clear();
        self.handlers.clear();
    }

    /// Releases the feed subscription and clears all per-element state.
    ///
    /// Idempotent, and safe to request from inside an event handler through a
    /// [`DestroyHandle`].
    pub fn destroy(&mut self) {
        self.destroyed.destroy();
        self.alive();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.is_destroyed()
    }

    pub fn destroy_handle(&self) -> DestroyHandle {
        self.destroyed.clone()
    }

    /// Subscribes `handler` to events of `kind`. Returns `None` once destroyed.
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl Fn(&ScrollEvent<'_, K>) + Send + Sync + 'static,
    ) -> Option<HandlerId> {
        if !self.alive() {
            return None;
        }
        Some(self.handlers.add(kind, Arc::new(handler)))
    }

    pub fn off(&mut self, id: HandlerId) -> bool {
        if !self.alive() {
            return false;
        }
        self.handlers.remove(id)
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.len(kind)
    }

    /// Registers a correction filter (see [`FilterPipeline`]). Returns `None` once destroyed.
    pub fn on_size(
        &mut self,
        filter: impl Fn(&FilterInput<'_, K>) -> Option<Size> + Send + Sync + 'static,
    ) -> Option<FilterId> {
        self.add_filter(Arc::new(filter))
    }

    pub fn add_filter(&mut self, filter: CorrectionFilter<K>) -> Option<FilterId> {
        if !self.alive() {
            return None;
        }
        Some(self.filters.register(filter))
    }

    pub fn remove_filter(&mut self, id: FilterId) -> bool {
        if !self.alive() {
            return false;
        }
        self.filters.unregister(id)
    }

    /// See [`simple_on_height`].
    pub fn simple_on_height<I, S>(tags: I) -> CorrectionFilter<K>
    where
        I: IntoIterator<Item = S>,
        S: Into<alloc::string::String>,
    {
        simple_on_height(tags)
    }

    pub fn merge_rule(&self) -> MergeRule {
        self.filters.merge_rule()
    }

    pub fn set_merge_rule(&mut self, merge_rule: MergeRule) {
        if self.alive() {
            self.filters.set_merge_rule(merge_rule);
        }
    }

    /// Drains the feed, handles every notification, then fires the debounce timer if due.
    ///
    /// A failing notification does not stop the rest of the batch: every drained notification is
    /// handled and the timer still runs. The first error is returned afterwards.
    pub fn pump(&mut self, now_ms: u64) -> Result<()> {
        if !self.alive() {
            return Ok(());
        }
        let mut pending = Vec::new();
        self.feed.drain(&mut |n| pending.push(n));
        let mut first_error = None;
        for notification in pending {
            if let Err(err) = self.handle(notification, now_ms) {
                first_error.get_or_insert(err);
            }
        }
        self.tick(now_ms);
        first_error.map_or(Ok(()), Err)
    }

    /// Handles one notification delivered by the host.
    pub fn handle(&mut self, notification: Notification<K>, now_ms: u64) -> Result<()> {
        if !self.alive() {
            return Ok(());
        }
        match notification {
            Notification::Scroll => {
                self.on_scroll(now_ms);
                Ok(())
            }
            Notification::Mutation(batch) => self.on_mutations(&batch, now_ms),
            Notification::Resize(batch) => self.on_resize(&batch, now_ms),
            Notification::Loaded(key) => {
                self.on_media_loaded(&key, now_ms);
                Ok(())
            }
        }
    }

    /// Fires the debounced classification when its deadline has passed.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.alive() {
            return;
        }
        if self.dispatcher.due(now_ms) {
            self.settle_and_emit();
        }
    }

    /// When the pending debounce fires, if a scroll burst is in progress.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.dispatcher.deadline_ms()
    }

    pub fn is_settling(&self) -> bool {
        self.dispatcher.is_armed()
    }

    fn on_scroll(&mut self, now_ms: u64) {
        self.refresh_visibility();
        self.last_metrics = self.host.metrics();
        self.dispatcher.arm(now_ms, self.options.debounce_time_ms);
        sstrace!(
            now_ms,
            offset = self.last_metrics.scroll_offset,
            "SmartScroller::on_scroll"
        );
    }

    fn on_mutations(&mut self, batch: &MutationBatch<K>, now_ms: u64) -> Result<()> {
        if !self.options.observe_mutations || !batch.is_relevant(&self.options.attribute_filter) {
            return Ok(());
        }

        batch.for_each_removed(|key| {
            self.visibility.forget(key);
            self.sizes.forget(key);
            self.media.forget(key, &mut self.feed);
        });

        let selector = &self.options.query_selector;
        batch.for_each_added(|key| match self.host.element(key) {
            Some(el) if selector.matches(&el) => {
                self.media.observe(&el, &mut self.feed);
            }
            Some(_) => {}
            None => {
                sswarn!("mutation batch added an element the host does not report");
            }
        });

        self.correction_pass(now_ms)
    }

    fn on_resize(&mut self, batch: &ResizeBatch<K>, now_ms: u64) -> Result<()> {
        if !self.options.observe_mutations {
            return Ok(());
        }
        for entry in &batch.entries {
            let Some(el) = self.host.element(&entry.key) else {
                sswarn!("resize notification for an element the host does not report");
                continue;
            };
            if !self.options.query_selector.matches(&el) {
                continue;
            }
            self.sizes.observe(&entry.key, entry.size, el.child_count);
        }
        self.correction_pass(now_ms)
    }

    fn on_media_loaded(&mut self, key: &K, now_ms: u64) {
        if !self.media.complete(key) {
            sswarn!("load completion for an element that was not pending");
            return;
        }
        self.refresh_visibility();
        if self.dispatcher.paused() || !self.options.auto_scroll_bottom {
            return;
        }
        let metrics = self.host.metrics();
        let bottom = metrics.max_scroll_offset();
        sstrace!(bottom, pending = self.media.pending_len(), "media loaded, re-pinning");
        if bottom != metrics.scroll_offset {
            self.host.set_scroll_offset(bottom);
            self.on_scroll(now_ms);
        }
    }

    /// Refreshes visibility outside a correction pass. Flips seen here belong to scrolling, not
    /// to a content change, so they are not handed to the filters.
    fn refresh_visibility(&mut self) {
        self.visibility
            .refresh(&self.host, &self.options.query_selector);
        self.visibility.clear_changed();
    }

    fn correction_pass(&mut self, now_ms: u64) -> Result<()> {
        let prev = self.last_metrics;
        self.visibility
            .refresh(&self.host, &self.options.query_selector);
        let next = self.host.metrics();

        // Kept until the pass succeeds; a failed pass leaves them for the next one.
        let mut changed = KeySet::default();
        changed.extend(self.sizes.changed().cloned());
        changed.extend(self.visibility.changed().cloned());

        let input = PolicyInput {
            prev,
            next,
            boundary: classify(&prev, self.options.extra_scroll_boundary),
            paused: self.dispatcher.paused(),
            auto_scroll_bottom: self.options.auto_scroll_bottom,
            preserve_scroll_on_layout_shift: self.options.preserve_scroll_on_layout_shift,
        };
        let decision = decide(&input, || self.compensation(&changed))?;
        self.sizes.clear_changed();
        self.visibility.clear_changed();
        sstrace!(
            ?decision,
            changed = changed.len(),
            prev_offset = prev.scroll_offset,
            prev_extent = prev.scroll_extent,
            next_extent = next.scroll_extent,
            "correction pass"
        );

        match decision {
            Decision::Compensate {
                offset,
                horizontal_advance,
            } => {
                self.host.set_scroll_offset(offset);
                if horizontal_advance > 0.0 {
                    let left = self.host.scroll_left();
                    self.host.set_scroll_left(left + horizontal_advance);
                }
            }
            Decision::PinBottom { offset } | Decision::AnchorBottom { offset } => {
                self.host.set_scroll_offset(offset);
            }
            Decision::Keep => {}
        }

        let moved = decision
            .offset()
            .is_some_and(|offset| offset != next.scroll_offset);
        if moved {
            // A programmatic scroll is reported like any other tick.
            self.on_scroll(now_ms);
        } else {
            self.last_metrics = self.host.metrics();
        }
        Ok(())
    }

    /// Runs the filter pipeline over changed elements that were or are visible.
    ///
    /// Elements that were not resized in this batch (visibility flips only) are presented with
    /// `old == new`, so a resize already compensated by an earlier pass is not counted twice.
    fn compensation(&self, changed: &KeySet<K>) -> Result<Option<Size>> {
        let inputs = changed
            .iter()
            .filter(|key| self.visibility.was_or_is_visible(key))
            .filter_map(|key| {
                let element = self.host.element(key)?;
                let mut size = self.sizes.sizes(key);
                let mut child_count = self.sizes.child_counts(key);
                if !self.sizes.is_changed(key) {
                    size.old = size.new;
                    child_count.old = child_count.new;
                }
                Some(FilterInput {
                    element,
                    size,
                    child_count,
                })
            });
        self.filters.run(inputs)
    }

    fn settle_and_emit(&mut self) {
        let metrics = self.host.metrics();
        let boundary = classify(&metrics, self.options.extra_scroll_boundary);
        self.dispatcher
            .settle(&metrics, boundary, self.options.auto_scroll_bottom);
        self.last_metrics = metrics;
        sstrace!(
            offset = metrics.scroll_offset,
            paused = self.dispatcher.paused(),
            "debounced scroll settled"
        );

        let report = ScrollReport {
            metrics,
            visibility: &self.visibility,
        };
        let flag = self.destroyed.clone();
        let keep_going = || !flag.is_destroyed();

        self.handlers.emit(
            &ScrollEvent::ScrollBoundary {
                status: boundary.status(),
                report,
            },
            &keep_going,
        );
        self.handlers.emit(
            &ScrollEvent::ExtraScrollBoundary {
                status: boundary.custom_status(),
                report,
            },
            &keep_going,
        );
        if self.dispatcher.paused() {
            self.handlers
                .emit(&ScrollEvent::ScrollPause(report), &keep_going);
        } else {
            self.handlers
                .emit(&ScrollEvent::AutoScroll(report), &keep_going);
        }

        // A handler may have requested teardown.
        self.alive();
    }

    pub fn scroll_to_top(&mut self, now_ms: u64) {
        self.scroll_to(0.0, now_ms);
    }

    /// Idempotent: repeated calls land on the same offset.
    pub fn scroll_to_bottom(&mut self, now_ms: u64) {
        let bottom = self.host.metrics().max_scroll_offset();
        self.scroll_to(bottom, now_ms);
    }

    fn scroll_to(&mut self, offset: f64, now_ms: u64) {
        if !self.alive() {
            return;
        }
        self.host.set_scroll_offset(offset);
        let metrics = self.host.metrics();
        let boundary = classify(&metrics, self.options.extra_scroll_boundary);
        self.dispatcher
            .settle(&metrics, boundary, self.options.auto_scroll_bottom);
        self.on_scroll(now_ms);
    }

    fn live_boundary(&self) -> BoundaryState {
        classify(&self.host.metrics(), self.options.extra_scroll_boundary)
    }

    pub fn is_user_at_top(&self) -> bool {
        self.live_boundary().at_top
    }

    pub fn is_user_at_bottom(&self) -> bool {
        self.live_boundary().at_bottom
    }

    pub fn is_user_at_custom_top(&self) -> bool {
        self.live_boundary().at_custom_top
    }

    pub fn is_user_at_custom_bottom(&self) -> bool {
        self.live_boundary().at_custom_bottom
    }

    /// Whether auto-following is suspended (as of the last settled scroll burst).
    pub fn is_scroll_paused(&self) -> bool {
        self.dispatcher.paused()
    }

    pub fn last_known_scroll_bottom_offset(&self) -> f64 {
        self.dispatcher.last_known_bottom_offset()
    }

    pub fn extra_scroll_boundary(&self) -> f64 {
        self.options.extra_scroll_boundary
    }

    pub fn set_extra_scroll_boundary(&mut self, extra_scroll_boundary: f64) -> Result<()> {
        if !self.alive() {
            return Ok(());
        }
        if !extra_scroll_boundary.is_finite() || extra_scroll_boundary < 0.0 {
            return Err(Error::InvalidOption {
                option: "extra_scroll_boundary",
                reason: "must be finite and not negative",
            });
        }
        self.options.extra_scroll_boundary = extra_scroll_boundary;
        Ok(())
    }

    /// Returns a lightweight snapshot of the engine's classification state.
    pub fn state(&self) -> ScrollerState {
        ScrollerState {
            metrics: self.last_metrics,
            boundary: self.dispatcher.last_boundary(),
            paused: self.dispatcher.paused(),
            last_known_scroll_bottom_offset: self.dispatcher.last_known_bottom_offset(),
            extra_scroll_boundary: self.options.extra_scroll_boundary,
            destroyed: self.is_destroyed(),
        }
    }
}

impl<H, F, K> core::fmt::Debug for SmartScroller<H, F, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmartScroller")
            .field("options", &self.options)
            .field("last_metrics", &self.last_metrics)
            .field("dispatcher", &self.dispatcher)
            .field("filters", &self.filters)
            .field("destroyed", &self.destroyed.is_destroyed())
            .finish_non_exhaustive()
    }
}
