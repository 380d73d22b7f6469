use smart_scroller::ScrollerOptions;
use smart_scroller_adapter::{Controller, SimHost, SimNode};

fn main() -> Result<(), smart_scroller::Error> {
    // Example: load older history above the reader without a visual jump.
    //
    // A correction filter reports how much the content above the reading position grew. Here the
    // built-in height filter is used; it ignores elements whose child count changed between
    // observations.
    let host = SimHost::new(320.0, 400.0)
        .with_nodes((100..120).map(|k| SimNode::new(k, "p", 50.0).with_child_count(1)));
    let mut c = Controller::new(host, ScrollerOptions::new())?;
    c.scroller_mut()
        .add_filter(smart_scroller::simple_on_height(["p"]));

    c.user_scroll(300.0, 0)?;
    c.tick(100)?;
    let anchor = c.host().node_top(106).unwrap_or_default() - c.scroll_offset();
    println!("before: offset={} anchor_in_viewport={anchor}", c.scroll_offset());

    for key in (90..100).rev() {
        c.prepend(SimNode::new(key, "p", 50.0).with_child_count(1), 200)?;
    }
    let anchor = c.host().node_top(106).unwrap_or_default() - c.scroll_offset();
    println!("after: offset={} anchor_in_viewport={anchor}", c.scroll_offset());

    // A message the reader is looking at expands (a link preview opened). The height filter
    // shifts the viewport by the growth so the text below it stays put.
    c.resize(107, 120.0, 300)?;
    println!("after expand: offset={}", c.scroll_offset());
    Ok(())
}
