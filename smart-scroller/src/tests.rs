use crate::*;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug)]
struct Node {
    key: u64,
    tag: String,
    height: f64,
    width: f64,
    child_count: usize,
    complete: bool,
}

impl Node {
    fn new(key: u64, tag: &str, height: f64) -> Self {
        Self {
            key,
            tag: String::from(tag),
            height,
            width: 300.0,
            child_count: 0,
            complete: true,
        }
    }
}

/// A vertical stack of nodes inside a fixed-height viewport.
#[derive(Clone, Debug)]
struct TestHost {
    nodes: Vec<Node>,
    viewport: f64,
    offset: f64,
    left: f64,
}

impl TestHost {
    fn stack(count: u64, height: f64, viewport: f64) -> Self {
        Self {
            nodes: (0..count).map(|k| Node::new(k, "p", height)).collect(),
            viewport,
            offset: 0.0,
            left: 0.0,
        }
    }

    fn at(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    fn extent(&self) -> f64 {
        let content: f64 = self.nodes.iter().map(|n| n.height).sum();
        content.max(self.viewport)
    }

    fn node_mut(&mut self, key: u64) -> &mut Node {
        self.nodes.iter_mut().find(|n| n.key == key).unwrap()
    }

    fn view(&self, index: usize) -> Element<'_, u64> {
        let top: f64 = self.nodes[..index].iter().map(|n| n.height).sum();
        let node = &self.nodes[index];
        Element {
            key: &node.key,
            tag: &node.tag,
            rect: Rect::new(0.0, top - self.offset, node.width, node.height),
            child_count: node.child_count,
            complete: node.complete,
        }
    }
}

impl ScrollHost<u64> for TestHost {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.offset, self.extent(), self.viewport)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 300.0, self.viewport)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    fn scroll_left(&self) -> f64 {
        self.left
    }

    fn set_scroll_left(&mut self, left: f64) {
        self.left = left;
    }

    fn for_each_element(&self, f: &mut dyn FnMut(Element<'_, u64>)) {
        for i in 0..self.nodes.len() {
            f(self.view(i));
        }
    }

    fn element(&self, key: &u64) -> Option<Element<'_, u64>> {
        let index = self.nodes.iter().position(|n| n.key == *key)?;
        Some(self.view(index))
    }
}

type Engine = SmartScroller<TestHost, QueueFeed<u64>, u64>;

fn engine(host: TestHost, options: ScrollerOptions<u64>) -> Engine {
    SmartScroller::new(host, QueueFeed::new(), options).unwrap()
}

/// Counts emitted events per kind and remembers the last boundary statuses.
#[derive(Default)]
struct Recorder {
    counts: [AtomicUsize; 4],
    statuses: Mutex<Vec<(EventKind, Option<BoundaryStatus>)>>,
}

impl Recorder {
    fn attach(engine: &mut Engine) -> Arc<Recorder> {
        let rec = Arc::new(Recorder::default());
        for (slot, kind) in EventKind::ALL.into_iter().enumerate() {
            let rec = Arc::clone(&rec);
            engine
                .on(kind, move |ev| {
                    rec.counts[slot].fetch_add(1, Ordering::SeqCst);
                    rec.statuses.lock().unwrap().push((ev.kind(), ev.status()));
                })
                .unwrap();
        }
        rec
    }

    fn count(&self, kind: EventKind) -> usize {
        let slot = EventKind::ALL.iter().position(|k| *k == kind).unwrap();
        self.counts[slot].load(Ordering::SeqCst)
    }

    fn last_status(&self, kind: EventKind) -> Option<BoundaryStatus> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, s)| *s)
    }
}

fn seed_sizes(e: &mut Engine) {
    let entries = e
        .host()
        .nodes
        .iter()
        .map(|n| ResizeEntry {
            key: n.key,
            size: Size::new(n.height, n.width),
        })
        .collect();
    e.feed_mut().push_resize(ResizeBatch::new(entries));
    e.pump(0).unwrap();
}

// ---------------------------------------------------------------------------------------------
// geometry

#[test]
fn rect_relations() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(
        relation(&Rect::new(10.0, 10.0, 20.0, 20.0), &outer),
        Relation::Inside
    );
    assert_eq!(
        relation(&Rect::new(-10.0, -10.0, 200.0, 200.0), &outer),
        Relation::Encloses
    );
    assert_eq!(
        relation(&Rect::new(90.0, 90.0, 20.0, 20.0), &outer),
        Relation::Overlaps
    );
    // Touching along an edge is not an overlap.
    assert_eq!(
        relation(&Rect::new(0.0, 100.0, 100.0, 50.0), &outer),
        Relation::Disjoint
    );
    assert_eq!(relation(&outer, &outer), Relation::Inside);
}

#[test]
fn intersection_is_the_shared_area() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(50.0, 80.0, 100.0, 100.0);
    assert_eq!(intersection(&a, &b), Some(Rect::new(50.0, 80.0, 50.0, 20.0)));
    assert_eq!(intersection(&a, &Rect::new(200.0, 0.0, 5.0, 5.0)), None);
    assert!(contains(&a, &Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert!(!intersects(&a, &Rect::new(100.0, 0.0, 10.0, 10.0)));
}

// ---------------------------------------------------------------------------------------------
// boundary classifier

#[test]
fn strict_boundaries_hold_across_the_scroll_range() {
    let (extent, viewport) = (1000.0, 400.0);
    for step in 0..=600 {
        let offset = step as f64;
        let b = classify(&ScrollMetrics::new(offset, extent, viewport), 0.0);
        assert_eq!(b.at_top, offset == 0.0, "offset={offset}");
        assert_eq!(
            b.at_bottom,
            offset + viewport >= extent - BOTTOM_TOLERANCE,
            "offset={offset}"
        );
    }
}

#[test]
fn bottom_tolerance_absorbs_sub_pixel_rounding() {
    let b = classify(&ScrollMetrics::new(599.5, 1000.0, 400.0), 0.0);
    assert!(b.at_bottom);
    let b = classify(&ScrollMetrics::new(598.5, 1000.0, 400.0), 0.0);
    assert!(!b.at_bottom);
}

#[test]
fn content_that_fits_is_at_both_boundaries() {
    let b = classify(&ScrollMetrics::new(0.0, 300.0, 400.0), 0.0);
    assert_eq!(b.status(), Some(BoundaryStatus::All));
    assert_eq!(b.custom_status(), Some(BoundaryStatus::All));

    let empty = classify(&ScrollMetrics::default(), 0.0);
    assert_eq!(empty.status(), Some(BoundaryStatus::All));
}

#[test]
fn custom_boundary_widens_the_thresholds() {
    // offset 15 with a 20 unit margin: near the top, not at it.
    let b = classify(&ScrollMetrics::new(15.0, 1000.0, 400.0), 20.0);
    assert!(!b.at_top);
    assert!(b.at_custom_top);
    assert_eq!(b.status(), None);
    assert_eq!(b.custom_status(), Some(BoundaryStatus::Top));

    let b = classify(&ScrollMetrics::new(585.0, 1000.0, 400.0), 20.0);
    assert!(!b.at_bottom);
    assert!(b.at_custom_bottom);
    assert_eq!(b.custom_status(), Some(BoundaryStatus::Bottom));
}

// ---------------------------------------------------------------------------------------------
// stores

#[test]
fn double_buffer_shifts_new_into_old() {
    let mut b = DoubleBuffer::first(0u32, 1);
    b.push(2);
    assert_eq!(b, DoubleBuffer { old: 1, new: 2 });
    assert!(b.changed());
    b.push(2);
    assert!(!b.changed());
}

#[test]
fn size_store_defaults_and_double_buffers() {
    let mut s = SizeStore::<u64>::new();
    assert_eq!(s.sizes(&7), DoubleBuffer::default());
    assert_eq!(s.sizes(&7).new, Size::ZERO);

    // The first observation moves nothing into `old`: it keeps the `{0, 0}` default.
    assert!(s.observe(&7, Size::new(10.0, 5.0), 1));
    assert_eq!(
        s.sizes(&7),
        DoubleBuffer {
            old: Size::ZERO,
            new: Size::new(10.0, 5.0),
        }
    );
    assert!(s.is_changed(&7));
    s.clear_changed();
    assert_eq!(s.changed().count(), 0);

    assert!(!s.observe(&7, Size::new(10.0, 5.0), 1));
    assert!(!s.is_changed(&7));
    assert!(!s.observe(&8, Size::ZERO, 0));

    assert!(s.observe(&7, Size::new(30.0, 5.0), 2));
    assert_eq!(
        s.sizes(&7),
        DoubleBuffer {
            old: Size::new(10.0, 5.0),
            new: Size::new(30.0, 5.0),
        }
    );
    assert_eq!(s.child_counts(&7), DoubleBuffer { old: 1, new: 2 });
    assert_eq!(s.changed().copied().collect::<Vec<_>>(), vec![7]);

    s.forget(&7);
    assert!(!s.contains(&7));
    assert!(!s.is_changed(&7));
    assert_eq!(s.len(), 1);
}

#[test]
fn visibility_old_slot_trails_new_by_one_tick() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());

    // Node 1 sits at 100..200: visible at offset 0.
    assert_eq!(e.visibility().get(&1), Some(DoubleBuffer::first(false, true)));

    e.host_mut().offset = 300.0;
    e.handle(Notification::Scroll, 0).unwrap();
    let after_first = e.visibility().get(&1).unwrap();
    assert_eq!(after_first, DoubleBuffer { old: true, new: false });

    e.host_mut().offset = 0.0;
    e.handle(Notification::Scroll, 10).unwrap();
    let after_second = e.visibility().get(&1).unwrap();
    assert_eq!(after_second.old, after_first.new);
    assert!(after_second.new);

    // Node 9 (900..1000) was never within the viewport.
    assert!(!e.visibility().was_or_is_visible(&9));
}

#[test]
fn query_selector_restricts_tracking() {
    let mut host = TestHost::stack(4, 100.0, 400.0);
    host.node_mut(2).tag = String::from("IMG");
    host.node_mut(2).complete = true;
    let e = engine(
        host,
        ScrollerOptions::new().with_query_selector(ElementSelector::tags(["img"])),
    );
    assert_eq!(e.visibility().len(), 1);
    assert!(e.visibility().is_visible(&2));
}

// ---------------------------------------------------------------------------------------------
// filter pipeline

fn input_for<'a>(key: &'a u64, tag: &'static str, old: f64, new: f64, children: (usize, usize)) -> FilterInput<'a, u64> {
    FilterInput {
        element: Element {
            key,
            tag,
            rect: Rect::new(0.0, 0.0, 10.0, new),
            child_count: children.1,
            complete: true,
        },
        size: DoubleBuffer {
            old: Size::new(old, 10.0),
            new: Size::new(new, 10.0),
        },
        child_count: DoubleBuffer {
            old: children.0,
            new: children.1,
        },
    }
}

fn constant(h: f64) -> CorrectionFilter<u64> {
    Arc::new(move |_: &FilterInput<'_, u64>| Some(Size::new(h, 0.0)))
}

#[test]
fn merge_rule_controls_how_filters_combine_per_element() {
    let key = 1u64;
    let mut p = FilterPipeline::<u64>::new().with_merge_rule(MergeRule::Sum);
    assert_eq!(p.merge_rule(), MergeRule::Sum);
    p.register(constant(10.0));
    p.register(Arc::new(|_: &FilterInput<'_, u64>| -> Option<Size> { None }));
    p.register(constant(20.0));

    let input = input_for(&key, "p", 0.0, 0.0, (0, 0));
    assert_eq!(p.evaluate(&input).unwrap(), Some(Size::new(30.0, 0.0)));

    p.set_merge_rule(MergeRule::FirstWins);
    assert_eq!(p.evaluate(&input).unwrap(), Some(Size::new(10.0, 0.0)));

    p.set_merge_rule(MergeRule::default());
    assert_eq!(p.merge_rule(), MergeRule::LastWins);
    assert_eq!(p.evaluate(&input).unwrap(), Some(Size::new(20.0, 0.0)));
}

#[test]
fn results_for_different_elements_are_summed() {
    let (a, b) = (1u64, 2u64);
    let mut p = FilterPipeline::<u64>::new();
    p.register(simple_on_height(Vec::<String>::new()));

    let total = p
        .run([
            input_for(&a, "p", 100.0, 150.0, (1, 1)),
            input_for(&b, "p", 40.0, 30.0, (0, 0)),
        ])
        .unwrap();
    assert_eq!(total, Some(Size::new(40.0, 0.0)));

    assert_eq!(p.run(Vec::new()).unwrap(), None);
}

#[test]
fn unregistering_keeps_the_other_filters() {
    let key = 1u64;
    let mut p = FilterPipeline::<u64>::new();
    let first = p.register(constant(1.0));
    let second = p.register(constant(2.0));
    assert_ne!(first, second);
    assert!(p.unregister(second));
    assert!(!p.unregister(second));
    assert_eq!(p.len(), 1);
    let input = input_for(&key, "p", 0.0, 0.0, (0, 0));
    assert_eq!(p.evaluate(&input).unwrap(), Some(Size::new(1.0, 0.0)));
}

#[test]
fn simple_on_height_skips_restructured_and_unlisted_elements() {
    let key = 1u64;
    let f = simple_on_height::<u64, _, _>(["img", "P"]);

    assert_eq!(
        f(&input_for(&key, "p", 100.0, 160.0, (2, 2))),
        Some(Size::new(60.0, 0.0))
    );
    // Child count changed between observations: mid-restructure, no opinion.
    assert_eq!(f(&input_for(&key, "p", 100.0, 160.0, (2, 3))), None);
    // Not one of the listed kinds.
    assert_eq!(f(&input_for(&key, "div", 100.0, 160.0, (2, 2))), None);
    // Same height: no opinion rather than a zero delta.
    assert_eq!(f(&input_for(&key, "p", 100.0, 100.0, (2, 2))), None);
}

#[test]
fn non_finite_filter_results_are_errors() {
    let key = 1u64;
    let mut p = FilterPipeline::<u64>::new();
    let id = p.register(constant(f64::NAN));
    let err = p.evaluate(&input_for(&key, "p", 0.0, 0.0, (0, 0))).unwrap_err();
    match err {
        Error::MalformedCorrection { filter, .. } => assert_eq!(filter, id),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------------------------
// policy

fn policy_input(prev: ScrollMetrics, next: ScrollMetrics) -> PolicyInput {
    PolicyInput {
        prev,
        next,
        boundary: classify(&prev, 0.0),
        paused: true,
        auto_scroll_bottom: true,
        preserve_scroll_on_layout_shift: true,
    }
}

#[test]
fn compensation_uses_the_extent_delta_without_filter_opinions() {
    let input = policy_input(
        ScrollMetrics::new(300.0, 1000.0, 400.0),
        ScrollMetrics::new(300.0, 1080.0, 400.0),
    );
    let d = decide(&input, || Ok(None)).unwrap();
    assert_eq!(
        d,
        Decision::Compensate {
            offset: 380.0,
            horizontal_advance: 0.0
        }
    );
}

#[test]
fn compensation_prefers_filter_results() {
    let input = policy_input(
        ScrollMetrics::new(300.0, 1000.0, 400.0),
        ScrollMetrics::new(300.0, 1050.0, 400.0),
    );
    let d = decide(&input, || Ok(Some(Size::new(50.0, 12.0)))).unwrap();
    assert_eq!(
        d,
        Decision::Compensate {
            offset: 350.0,
            horizontal_advance: 12.0
        }
    );
}

#[test]
fn zero_compensation_falls_back_to_the_extent_delta() {
    let input = policy_input(
        ScrollMetrics::new(300.0, 1000.0, 400.0),
        ScrollMetrics::new(300.0, 1050.0, 400.0),
    );
    let d = decide(&input, || Ok(Some(Size::ZERO))).unwrap();
    assert_eq!(
        d,
        Decision::Compensate {
            offset: 350.0,
            horizontal_advance: 0.0
        }
    );

    // A width-only opinion still advances horizontally.
    let d = decide(&input, || Ok(Some(Size::new(0.0, 8.0)))).unwrap();
    assert_eq!(
        d,
        Decision::Compensate {
            offset: 350.0,
            horizontal_advance: 8.0
        }
    );
}

#[test]
fn pin_only_applies_while_not_paused() {
    let prev = ScrollMetrics::new(600.0, 1000.0, 400.0);
    let next = ScrollMetrics::new(600.0, 1200.0, 400.0);
    let mut input = policy_input(prev, next);
    input.paused = false;
    assert_eq!(
        decide(&input, || Ok(None)).unwrap(),
        Decision::PinBottom { offset: 800.0 }
    );

    input.paused = true;
    assert_eq!(decide(&input, || Ok(None)).unwrap(), Decision::Keep);
}

#[test]
fn at_top_with_preservation_off_passes_through() {
    let mut input = policy_input(
        ScrollMetrics::new(0.0, 1000.0, 400.0),
        ScrollMetrics::new(0.0, 1100.0, 400.0),
    );
    input.preserve_scroll_on_layout_shift = false;
    let d = decide(&input, || panic!("filters must not run")).unwrap();
    assert_eq!(d, Decision::Keep);
}

#[test]
fn anchor_keeps_distance_from_bottom() {
    let mut input = policy_input(
        ScrollMetrics::new(300.0, 1000.0, 400.0),
        ScrollMetrics::new(300.0, 1250.0, 400.0),
    );
    input.auto_scroll_bottom = false;
    let d = decide(&input, || Ok(None)).unwrap();
    assert_eq!(d, Decision::AnchorBottom { offset: 550.0 });
}

#[test]
fn policy_offsets_are_clamped() {
    let input = policy_input(
        ScrollMetrics::new(300.0, 1000.0, 400.0),
        ScrollMetrics::new(300.0, 1000.0, 400.0),
    );
    let d = decide(&input, || Ok(Some(Size::new(-500.0, 0.0)))).unwrap();
    assert_eq!(d.offset(), Some(0.0));
}

// ---------------------------------------------------------------------------------------------
// engine

#[test]
fn growth_at_bottom_pins_and_reports_auto_scroll() {
    let host = TestHost::stack(10, 100.0, 400.0).at(600.0);
    let mut e = engine(host, ScrollerOptions::new());
    let rec = Recorder::attach(&mut e);
    assert!(!e.is_scroll_paused());

    e.host_mut().nodes.push(Node::new(10, "p", 100.0));
    e.host_mut().nodes.push(Node::new(11, "p", 100.0));
    e.feed_mut().push_mutation(MutationBatch::added(vec![10, 11]));
    e.pump(0).unwrap();

    assert_eq!(e.host().offset, 800.0);
    assert!(e.is_user_at_bottom());

    e.pump(99).unwrap();
    assert_eq!(rec.count(EventKind::ScrollBoundary), 0);

    e.pump(100).unwrap();
    assert_eq!(rec.count(EventKind::ScrollBoundary), 1);
    assert_eq!(rec.count(EventKind::ExtraScrollBoundary), 1);
    assert_eq!(rec.count(EventKind::AutoScroll), 1);
    assert_eq!(rec.count(EventKind::ScrollPause), 0);
    assert_eq!(
        rec.last_status(EventKind::ScrollBoundary),
        Some(BoundaryStatus::Bottom)
    );
    assert_eq!(e.last_known_scroll_bottom_offset(), 0.0);
}

#[test]
fn mid_scroll_growth_is_compensated_by_filters() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    assert_eq!(e.host().offset, 300.0);

    e.on_size(|input| {
        let delta = input.size.new.height - input.size.old.height;
        (delta != 0.0).then(|| Size::new(delta, 0.0))
    })
    .unwrap();

    // Node 3 spans the top of the viewport (300..400) and grows by 50.
    e.host_mut().node_mut(3).height = 150.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(3, Size::new(150.0, 300.0)));
    e.pump(10).unwrap();

    assert_eq!(e.host().offset, 350.0);
}

#[test]
fn width_compensation_advances_horizontal_scroll() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    e.on_size(|input| Some(Size::new(0.0, input.size.new.width - input.size.old.width)))
        .unwrap();

    e.host_mut().node_mut(4).width = 330.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(4, Size::new(100.0, 330.0)));
    e.pump(10).unwrap();

    assert_eq!(e.host().left, 30.0);
    assert_eq!(e.host().offset, 300.0);
}

#[test]
fn anchored_growth_preserves_bottom_distance() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new().with_auto_scroll_bottom(false));
    let prev_bottom = e.host().metrics().bottom_offset();

    e.host_mut().nodes.push(Node::new(10, "p", 250.0));
    e.feed_mut().push_mutation(MutationBatch::added(vec![10]));
    e.pump(0).unwrap();

    let m = e.host().metrics();
    assert_eq!(m.scroll_extent - m.scroll_offset - m.viewport_extent, prev_bottom);
    assert_eq!(m.scroll_offset, 550.0);
}

#[test]
fn a_scroll_burst_emits_once() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());
    let rec = Recorder::attach(&mut e);

    for (i, now) in [0u64, 20, 40, 60, 80].into_iter().enumerate() {
        e.host_mut().offset = 50.0 * (i as f64 + 1.0);
        e.feed_mut().push_scroll();
        e.pump(now).unwrap();
    }
    assert_eq!(e.next_deadline_ms(), Some(180));
    e.pump(179).unwrap();
    assert_eq!(rec.count(EventKind::ScrollBoundary), 0);

    e.pump(180).unwrap();
    e.pump(500).unwrap();
    assert_eq!(rec.count(EventKind::ScrollBoundary), 1);
    assert_eq!(rec.count(EventKind::ScrollPause), 1);
    assert_eq!(rec.count(EventKind::AutoScroll), 0);
    assert!(e.is_scroll_paused());
    assert_eq!(e.last_known_scroll_bottom_offset(), 350.0);
    assert_eq!(e.state().boundary.status(), None);
}

#[test]
fn scrolling_back_to_bottom_resumes_auto_scroll() {
    let host = TestHost::stack(10, 100.0, 400.0).at(200.0);
    let mut e = engine(host, ScrollerOptions::new());
    assert!(e.is_scroll_paused());

    e.host_mut().offset = 600.0;
    e.handle(Notification::Scroll, 0).unwrap();
    assert!(e.is_scroll_paused());
    e.tick(100);
    assert!(!e.is_scroll_paused());
}

#[test]
fn scroll_to_bottom_is_idempotent() {
    let host = TestHost::stack(10, 100.0, 400.0).at(120.0);
    let mut e = engine(host, ScrollerOptions::new());
    e.scroll_to_bottom(0);
    let first = e.host().offset;
    e.scroll_to_bottom(5);
    assert_eq!(e.host().offset, first);
    assert_eq!(first, 600.0);
    assert!(!e.is_scroll_paused());

    e.scroll_to_top(10);
    assert_eq!(e.host().offset, 0.0);
    assert!(e.is_user_at_top());
    assert!(e.is_scroll_paused());
}

#[test]
fn custom_boundaries_are_configurable_at_runtime() {
    let host = TestHost::stack(10, 100.0, 400.0).at(15.0);
    let mut e = engine(host, ScrollerOptions::new().with_extra_scroll_boundary(20.0));
    assert!(!e.is_user_at_top());
    assert!(e.is_user_at_custom_top());

    e.set_extra_scroll_boundary(10.0).unwrap();
    assert_eq!(e.extra_scroll_boundary(), 10.0);
    assert!(!e.is_user_at_custom_top());
    assert!(e.set_extra_scroll_boundary(f64::NAN).is_err());
    assert_eq!(e.extra_scroll_boundary(), 10.0);
}

#[test]
fn invalid_configuration_is_rejected() {
    let host = TestHost::stack(1, 100.0, 400.0);
    let err = SmartScroller::new(
        host.clone(),
        QueueFeed::new(),
        ScrollerOptions::new().with_extra_scroll_boundary(-1.0),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidOption {
            option: "extra_scroll_boundary",
            ..
        }
    ));

    let err = SmartScroller::new(
        host.clone(),
        QueueFeed::new(),
        ScrollerOptions::new().with_attribute_filter(AttributeFilter::new(["data id"])),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidOption { option: "attribute_filter", .. }));

    let mut broken = host;
    broken.viewport = f64::INFINITY;
    let err = SmartScroller::new(broken, QueueFeed::new(), ScrollerOptions::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidHost { .. }));
}

#[test]
fn malformed_filter_results_fail_the_pass() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    e.on_size(|_| Some(Size::new(f64::INFINITY, 0.0))).unwrap();

    e.host_mut().node_mut(3).height = 150.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(3, Size::new(150.0, 300.0)));
    assert!(matches!(
        e.pump(10),
        Err(Error::MalformedCorrection { .. })
    ));
}

#[test]
fn a_failing_pass_does_not_drop_the_rest_of_the_batch() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    let bad = e.on_size(|_| Some(Size::new(f64::NAN, 0.0))).unwrap();

    let mut video = Node::new(10, "video", 0.0);
    video.complete = false;
    e.host_mut().nodes.push(video);
    e.feed_mut().push_mutation(MutationBatch::added(vec![10]));
    e.pump(0).unwrap();
    assert!(e.media().is_pending(&10));

    // One pump: a resize the bad filter rejects, then a removal, then a scroll.
    e.host_mut().node_mut(3).height = 150.0;
    e.host_mut().nodes.retain(|n| n.key != 9 && n.key != 10);
    e.feed_mut()
        .push_resize(ResizeBatch::single(3, Size::new(150.0, 300.0)));
    e.feed_mut()
        .push_mutation(MutationBatch::removed(vec![9, 10]));
    e.feed_mut().push_scroll();
    assert!(matches!(
        e.pump(10),
        Err(Error::MalformedCorrection { .. })
    ));

    assert!(!e.sizes().contains(&9));
    assert!(e.visibility().get(&9).is_none());
    assert!(!e.media().is_pending(&10));
    assert!(!e.feed().is_watching_load(&10));
    assert!(e.feed().is_empty());
    assert!(e.is_settling());

    // The rejected resize is still pending and reaches the next pass.
    assert!(e.sizes().is_changed(&3));
    assert!(e.remove_filter(bad));
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        e.on_size(move |input| {
            seen.lock().unwrap().push((*input.element.key, input.size));
            None
        })
        .unwrap();
    }
    e.feed_mut().push_mutation(MutationBatch::attribute(0, "class"));
    e.pump(20).unwrap();
    assert!(!e.sizes().is_changed(&3));
    let seen = seen.lock().unwrap();
    let (_, size) = seen.iter().find(|(k, _)| *k == 3).unwrap();
    assert_eq!(size.old.height, 100.0);
    assert_eq!(size.new.height, 150.0);
}

#[test]
fn filters_only_see_elements_changed_by_the_current_batch() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        e.on_size(move |input| {
            seen.lock().unwrap().push(*input.element.key);
            None
        })
        .unwrap();
    }

    // Scrolling flips the visibility of most nodes.
    e.host_mut().offset = 300.0;
    e.handle(Notification::Scroll, 0).unwrap();
    e.host_mut().offset = 350.0;
    e.handle(Notification::Scroll, 10).unwrap();
    e.tick(110);

    // Node 9 (900..1000) stays below the viewport; nothing visible changes.
    e.host_mut().node_mut(9).height = 120.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(9, Size::new(120.0, 300.0)));
    e.pump(200).unwrap();
    assert!(seen.lock().unwrap().is_empty());

    // Node 4 (400..500) is on screen: it is the only one the filters see.
    e.host_mut().node_mut(4).height = 130.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(4, Size::new(130.0, 300.0)));
    e.pump(300).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![4]);
}

#[test]
fn visibility_flips_do_not_replay_earlier_resizes() {
    let host = TestHost::stack(10, 100.0, 400.0).at(300.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    e.add_filter(simple_on_height(Vec::<String>::new())).unwrap();

    // A node above the viewport grows and pushes node 2 into view. Node 2 still holds its
    // first observation (0 -> 100) and must not report it again.
    e.host_mut().node_mut(0).height = 150.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(0, Size::new(150.0, 300.0)));
    e.pump(0).unwrap();
    assert_eq!(e.host().offset, 350.0);

    // Node 3 grows while on screen, then node 1 grows above it. The second pass only sees
    // node 2 flipping back into view; node 3 was compensated already.
    e.host_mut().node_mut(3).height = 120.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(3, Size::new(120.0, 300.0)));
    e.pump(10).unwrap();
    assert_eq!(e.host().offset, 370.0);

    e.host_mut().node_mut(1).height = 160.0;
    e.feed_mut()
        .push_resize(ResizeBatch::single(1, Size::new(160.0, 300.0)));
    e.pump(20).unwrap();
    assert_eq!(e.host().offset, 430.0);
}

#[test]
fn attribute_filter_decides_which_mutations_count() {
    let f = AttributeFilter::default();
    assert!(f.matches("class"));
    assert!(f.matches("data-state"));
    assert!(!f.matches("aria-label"));
    assert!(AttributeFilter::all().matches("aria-label"));

    let host = TestHost::stack(10, 100.0, 400.0).at(600.0);
    let mut e = engine(host, ScrollerOptions::new());
    e.host_mut().node_mut(9).height = 300.0;
    assert!(!e.feed_mut().push_mutation(MutationBatch::attribute(9, "aria-label")));
    e.pump(0).unwrap();
    assert_eq!(e.host().offset, 600.0);

    assert!(e.feed_mut().push_mutation(MutationBatch::attribute(9, "style")));
    e.pump(0).unwrap();
    assert_eq!(e.host().offset, 800.0);
}

#[test]
fn without_mutation_observation_only_scroll_is_handled() {
    let host = TestHost::stack(10, 100.0, 400.0).at(600.0);
    let mut e = engine(host, ScrollerOptions::new().with_observe_mutations(false));

    e.host_mut().nodes.push(Node::new(10, "p", 100.0));
    assert!(!e.feed_mut().push_mutation(MutationBatch::added(vec![10])));
    // Even a notification delivered directly is ignored.
    e.handle(Notification::Mutation(MutationBatch::added(vec![10])), 0)
        .unwrap();
    assert_eq!(e.host().offset, 600.0);

    assert!(e.feed_mut().push_scroll());
}

#[test]
fn removed_elements_are_forgotten() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());
    seed_sizes(&mut e);
    assert!(e.sizes().contains(&2));
    assert!(e.visibility().get(&2).is_some());

    e.host_mut().nodes.retain(|n| n.key != 2);
    e.feed_mut().push_mutation(MutationBatch::removed(vec![2]));
    e.pump(0).unwrap();

    assert!(!e.sizes().contains(&2));
    assert!(e.visibility().get(&2).is_none());
    assert_eq!(e.visibility().len(), 9);
}

#[test]
fn loading_media_repins_to_bottom() {
    let mut host = TestHost::stack(10, 100.0, 400.0).at(600.0);
    let mut img = Node::new(10, "img", 0.0);
    img.complete = false;
    host.nodes.push(img);
    let mut e = engine(host, ScrollerOptions::new());

    assert_eq!(e.media().pending_len(), 1);
    assert!(e.feed().is_watching_load(&10));

    // The image resolves to 200 units; only the load event reaches the engine.
    let node = e.host_mut().node_mut(10);
    node.height = 200.0;
    node.complete = true;
    assert!(e.feed_mut().push_loaded(10));
    assert!(!e.feed_mut().push_loaded(10));
    e.pump(0).unwrap();

    assert_eq!(e.host().offset, 800.0);
    assert_eq!(e.media().pending_len(), 0);
    assert!(e.is_settling());
}

#[test]
fn media_added_later_is_watched_and_forgotten_on_removal() {
    let host = TestHost::stack(3, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());

    let mut video = Node::new(3, "video", 0.0);
    video.complete = false;
    e.host_mut().nodes.push(video);
    e.feed_mut().push_mutation(MutationBatch::added(vec![3]));
    e.pump(0).unwrap();
    assert!(e.media().is_pending(&3));

    e.host_mut().nodes.retain(|n| n.key != 3);
    e.feed_mut().push_mutation(MutationBatch::removed(vec![3]));
    e.pump(0).unwrap();
    assert!(!e.media().is_pending(&3));
    assert!(!e.feed().is_watching_load(&3));
}

#[test]
fn paused_media_load_leaves_the_viewport() {
    let mut host = TestHost::stack(10, 100.0, 400.0).at(200.0);
    let mut img = Node::new(10, "img", 0.0);
    img.complete = false;
    host.nodes.push(img);
    let mut e = engine(host, ScrollerOptions::new());
    assert!(e.is_scroll_paused());

    e.host_mut().node_mut(10).height = 200.0;
    e.feed_mut().push_loaded(10);
    e.pump(0).unwrap();
    assert_eq!(e.host().offset, 200.0);
    assert!(!e.is_settling());
}

#[test]
fn destroy_silences_everything() {
    let host = TestHost::stack(10, 100.0, 400.0).at(600.0);
    let mut e = engine(host, ScrollerOptions::new());
    let rec = Recorder::attach(&mut e);

    e.feed_mut().push_scroll();
    e.pump(0).unwrap();
    e.destroy();
    e.destroy();
    assert!(e.is_destroyed());
    assert!(!e.feed().is_subscribed());
    assert!(e.visibility().is_empty());

    // Pending timer fire is a no-op.
    e.tick(1_000);
    e.host_mut().nodes.push(Node::new(10, "p", 100.0));
    assert!(!e.feed_mut().push_mutation(MutationBatch::added(vec![10])));
    e.handle(Notification::Mutation(MutationBatch::added(vec![10])), 0)
        .unwrap();
    e.pump(2_000).unwrap();
    e.scroll_to_bottom(2_000);
    e.scroll_to_top(2_000);
    assert!(e.on(EventKind::AutoScroll, |_| {}).is_none());
    assert!(e.on_size(|_| None).is_none());
    assert!(e.set_extra_scroll_boundary(5.0).is_ok());

    assert_eq!(e.host().offset, 600.0);
    for kind in EventKind::ALL {
        assert_eq!(rec.count(kind), 0);
    }
    assert!(e.state().destroyed);
}

#[test]
fn destroy_from_inside_a_handler_stops_emission() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());
    let handle = e.destroy_handle();
    e.on(EventKind::ScrollBoundary, move |_| handle.destroy())
        .unwrap();
    let rec = Recorder::attach(&mut e);

    e.handle(Notification::Scroll, 0).unwrap();
    e.tick(100);

    assert!(e.is_destroyed());
    assert_eq!(rec.count(EventKind::ScrollBoundary), 0);
    assert_eq!(rec.count(EventKind::ExtraScrollBoundary), 0);
    assert_eq!(rec.count(EventKind::ScrollPause), 0);
    assert!(!e.feed().is_subscribed());
}

#[test]
fn handlers_can_be_removed() {
    let host = TestHost::stack(10, 100.0, 400.0);
    let mut e = engine(host, ScrollerOptions::new());
    let hits = Arc::new(AtomicUsize::new(0));
    let id = {
        let hits = Arc::clone(&hits);
        e.on(EventKind::ScrollPause, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
    };
    assert_eq!(e.handler_count(EventKind::ScrollPause), 1);
    assert!(e.off(id));
    assert!(!e.off(id));

    e.handle(Notification::Scroll, 0).unwrap();
    e.tick(100);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn event_payload_carries_metrics_and_visibility() {
    let host = TestHost::stack(10, 100.0, 400.0).at(100.0);
    let mut e = engine(host, ScrollerOptions::new());
    let seen = Arc::new(Mutex::new(None));
    {
        let seen = Arc::clone(&seen);
        e.on(EventKind::ScrollBoundary, move |ev| {
            let report = ev.report();
            let visible: Vec<u64> = report
                .visibility
                .iter()
                .filter(|(_, b)| b.new)
                .map(|(k, _)| *k)
                .collect();
            *seen.lock().unwrap() = Some((report.metrics, visible.len()));
        })
        .unwrap();
    }
    e.handle(Notification::Scroll, 0).unwrap();
    e.tick(100);

    let (metrics, visible) = seen.lock().unwrap().take().unwrap();
    assert_eq!(metrics, ScrollMetrics::new(100.0, 1000.0, 400.0));
    // 100..500 covers nodes 1..=4.
    assert_eq!(visible, 4);
}
