use smart_scroller::{EventKind, ScrollerOptions};
use smart_scroller_adapter::{Controller, SimHost, SimNode};

fn main() -> Result<(), smart_scroller::Error> {
    // Example: a chat log that follows new messages while the reader is at the bottom, and stops
    // following once they scroll up.
    //
    // The adapter flow is typically:
    // 1) forward user scrolls and content changes to the controller
    // 2) call tick(now_ms) from a frame loop or timer
    // 3) read the (possibly corrected) offset back and apply it to the real container
    let host = SimHost::new(320.0, 400.0)
        .with_nodes((0..10).map(|k| SimNode::new(k, "p", 100.0)));
    let mut c = Controller::new(host, ScrollerOptions::new())?;
    c.scroller_mut().on(EventKind::ScrollPause, |ev| {
        println!("paused at {:?}", ev.report().metrics);
    });
    c.scroller_mut().on(EventKind::AutoScroll, |_| println!("following"));

    c.user_scroll(600.0, 0)?;
    c.tick(100)?;

    c.append(SimNode::new(10, "p", 80.0), 150)?;
    println!("new message: offset={}", c.scroll_offset());

    c.append(SimNode::loading(11, "img"), 200)?;
    c.finish_loading(11, 240.0, 350)?;
    println!("image loaded: offset={}", c.scroll_offset());
    c.tick(500)?;

    c.user_scroll(100.0, 600)?;
    c.tick(700)?;
    c.append(SimNode::new(12, "p", 60.0), 800)?;
    println!(
        "reader scrolled up: offset={} paused={}",
        c.scroll_offset(),
        c.scroller().is_scroll_paused()
    );
    Ok(())
}
