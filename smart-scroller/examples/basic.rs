// Example: a hand-written host, boundary events and the bottom pin.
use smart_scroller::{
    Element, EventKind, MutationBatch, QueueFeed, Rect, ScrollHost, ScrollMetrics,
    ScrollerOptions, SmartScroller,
};

/// A log view: every line is 20 units tall.
struct LogView {
    lines: Vec<u64>,
    viewport: f64,
    offset: f64,
}

impl ScrollHost<u64> for LogView {
    fn metrics(&self) -> ScrollMetrics {
        let extent = (self.lines.len() as f64 * 20.0).max(self.viewport);
        ScrollMetrics::new(self.offset, extent, self.viewport)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, 80.0, self.viewport)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    fn for_each_element(&self, f: &mut dyn FnMut(Element<'_, u64>)) {
        for (i, key) in self.lines.iter().enumerate() {
            f(Element {
                key,
                tag: "line",
                rect: Rect::new(0.0, i as f64 * 20.0 - self.offset, 80.0, 20.0),
                child_count: 0,
                complete: true,
            });
        }
    }

    fn element(&self, key: &u64) -> Option<Element<'_, u64>> {
        let i = self.lines.iter().position(|k| k == key)?;
        Some(Element {
            key: &self.lines[i],
            tag: "line",
            rect: Rect::new(0.0, i as f64 * 20.0 - self.offset, 80.0, 20.0),
            child_count: 0,
            complete: true,
        })
    }
}

fn main() -> Result<(), smart_scroller::Error> {
    let host = LogView {
        lines: (0..50).collect(),
        viewport: 200.0,
        offset: 0.0,
    };
    let mut s = SmartScroller::new(host, QueueFeed::new(), ScrollerOptions::new())?;

    s.on(EventKind::ScrollBoundary, |ev| {
        println!("boundary: {:?} at {:?}", ev.status(), ev.report().metrics);
    });
    s.on(EventKind::AutoScroll, |_| println!("following the tail"));

    s.scroll_to_bottom(0);
    s.pump(100)?;

    for (now_ms, key) in [(200u64, 50u64), (250, 51), (300, 52)] {
        s.host_mut().lines.push(key);
        s.feed_mut().push_mutation(MutationBatch::added(vec![key]));
        s.pump(now_ms)?;
        println!("appended {key}: offset={}", s.host().offset);
    }

    s.pump(1_000)?;
    println!("state={:?}", s.state());
    Ok(())
}
