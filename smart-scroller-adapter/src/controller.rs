use alloc::vec;

use smart_scroller::{
    MutationBatch, QueueFeed, ResizeBatch, ResizeEntry, Result, ScrollHost, ScrollerOptions, Size,
    SmartScroller,
};

use crate::{SimHost, SimNode};

/// The engine type a [`Controller`] drives.
pub type SimScroller = SmartScroller<SimHost, QueueFeed<u64>, u64>;

/// A framework-neutral controller that owns a [`SimHost`], its [`QueueFeed`] and the engine.
///
/// Each method applies one UI-level change to the host, queues the notifications a real host
/// would deliver for it, and pumps the engine. Time is passed in as `now_ms`; call
/// [`Controller::tick`] from a frame loop or timer so the scroll debounce can fire.
#[derive(Debug)]
pub struct Controller {
    s: SimScroller,
}

impl Controller {
    /// Wraps `host` in a new engine. Nodes already in the host are measured immediately.
    pub fn new(host: SimHost, options: ScrollerOptions<u64>) -> Result<Self> {
        let mut c = Self::from_scroller(SmartScroller::new(host, QueueFeed::new(), options)?);
        let entries = c.s.host().nodes().iter().map(measure).collect();
        c.s.feed_mut().push_resize(ResizeBatch::new(entries));
        c.s.pump(0)?;
        Ok(c)
    }

    pub fn from_scroller(s: SimScroller) -> Self {
        Self { s }
    }

    pub fn scroller(&self) -> &SimScroller {
        &self.s
    }

    pub fn scroller_mut(&mut self) -> &mut SimScroller {
        &mut self.s
    }

    pub fn into_scroller(self) -> SimScroller {
        self.s
    }

    pub fn host(&self) -> &SimHost {
        self.s.host()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.s.host().scroll_offset()
    }

    /// Adds `node` at the end of the content (new message in a chat log).
    pub fn append(&mut self, node: SimNode, now_ms: u64) -> Result<()> {
        let len = self.s.host().nodes().len();
        self.insert(len, node, now_ms)
    }

    /// Adds `node` before all existing content (older history loaded above).
    pub fn prepend(&mut self, node: SimNode, now_ms: u64) -> Result<()> {
        self.insert(0, node, now_ms)
    }

    pub fn insert(&mut self, index: usize, node: SimNode, now_ms: u64) -> Result<()> {
        let key = node.key;
        let entry = measure(&node);
        self.s.host_mut().insert(index, node);
        let feed = self.s.feed_mut();
        feed.push_mutation(MutationBatch::added(vec![key]));
        feed.push_resize(ResizeBatch::new(vec![entry]));
        self.s.pump(now_ms)
    }

    /// Removes node `key`. Returns `false` when the host has no such node.
    pub fn remove(&mut self, key: u64, now_ms: u64) -> Result<bool> {
        if self.s.host_mut().remove(key).is_none() {
            adebug!(key, "Controller::remove: unknown node");
            return Ok(false);
        }
        self.s
            .feed_mut()
            .push_mutation(MutationBatch::removed(vec![key]));
        self.s.pump(now_ms)?;
        Ok(true)
    }

    /// Changes the height of node `key`, as a content reflow would.
    pub fn resize(&mut self, key: u64, height: f64, now_ms: u64) -> Result<bool> {
        let Some(node) = self.s.host_mut().node_mut(key) else {
            adebug!(key, "Controller::resize: unknown node");
            return Ok(false);
        };
        node.height = height;
        let entry = measure(node);
        self.s
            .feed_mut()
            .push_resize(ResizeBatch::new(vec![entry]));
        self.s.pump(now_ms)?;
        Ok(true)
    }

    /// Reports an attribute change on node `key`. Whether it triggers a correction pass depends on
    /// the engine's attribute filter.
    pub fn set_attribute(&mut self, key: u64, name: &str, now_ms: u64) -> Result<bool> {
        let queued = self
            .s
            .feed_mut()
            .push_mutation(MutationBatch::attribute(key, name));
        self.s.pump(now_ms)?;
        Ok(queued)
    }

    /// Resolves a loading media node to its intrinsic `height`.
    ///
    /// The host reports the load completion first, then the resize.
    pub fn finish_loading(&mut self, key: u64, height: f64, now_ms: u64) -> Result<bool> {
        let Some(node) = self.s.host_mut().node_mut(key) else {
            adebug!(key, "Controller::finish_loading: unknown node");
            return Ok(false);
        };
        node.height = height;
        node.complete = true;
        let entry = measure(node);
        let feed = self.s.feed_mut();
        feed.push_loaded(key);
        feed.push_resize(ResizeBatch::new(vec![entry]));
        self.s.pump(now_ms)?;
        Ok(true)
    }

    /// Applies a user-initiated scroll (wheel, drag, keyboard).
    ///
    /// Returns the applied (clamped) offset.
    pub fn user_scroll(&mut self, offset: f64, now_ms: u64) -> Result<f64> {
        self.s.host_mut().set_scroll_offset(offset);
        self.s.feed_mut().push_scroll();
        self.s.pump(now_ms)?;
        Ok(self.scroll_offset())
    }

    /// Resizes the viewport itself (window resize, keyboard shown).
    pub fn set_viewport_height(&mut self, viewport_height: f64, now_ms: u64) -> Result<()> {
        let host = self.s.host_mut();
        host.set_viewport_height(viewport_height);
        let offset = host.scroll_offset();
        host.set_scroll_offset(offset);
        self.s.feed_mut().push_scroll();
        self.s.pump(now_ms)
    }

    /// Advances the engine clock; fires the scroll debounce when due.
    pub fn tick(&mut self, now_ms: u64) -> Result<()> {
        self.s.pump(now_ms)
    }
}

fn measure(node: &SimNode) -> ResizeEntry<u64> {
    ResizeEntry {
        key: node.key,
        size: Size::new(node.height, node.width),
    }
}
