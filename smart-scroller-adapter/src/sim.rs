use alloc::string::String;
use alloc::vec::Vec;

use smart_scroller::{Element, Rect, ScrollHost, ScrollMetrics};

/// One block in a [`SimHost`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimNode {
    pub key: u64,
    pub tag: String,
    pub height: f64,
    pub width: f64,
    pub child_count: usize,
    /// `false` while a media node is still loading.
    pub complete: bool,
}

impl SimNode {
    pub fn new(key: u64, tag: impl Into<String>, height: f64) -> Self {
        Self {
            key,
            tag: tag.into(),
            height,
            width: 0.0,
            child_count: 0,
            complete: true,
        }
    }

    /// A media node that has not resolved its size yet.
    pub fn loading(key: u64, tag: impl Into<String>) -> Self {
        Self {
            complete: false,
            ..Self::new(key, tag, 0.0)
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_child_count(mut self, child_count: usize) -> Self {
        self.child_count = child_count;
        self
    }
}

/// A headless scroll container: nodes stacked top to bottom in a fixed-height viewport.
///
/// Node widths of `0` fill the viewport width. Element rects are reported relative to the
/// viewport, so a node is visible when its rect intersects `[0, viewport_height)`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimHost {
    nodes: Vec<SimNode>,
    viewport_width: f64,
    viewport_height: f64,
    scroll_offset: f64,
    scroll_left: f64,
}

impl SimHost {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = SimNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, key: u64) -> Option<&SimNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn node_mut(&mut self, key: u64) -> Option<&mut SimNode> {
        self.nodes.iter_mut().find(|n| n.key == key)
    }

    pub fn push(&mut self, node: SimNode) {
        self.nodes.push(node);
    }

    pub fn insert(&mut self, index: usize, node: SimNode) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    pub fn remove(&mut self, key: u64) -> Option<SimNode> {
        let index = self.nodes.iter().position(|n| n.key == key)?;
        Some(self.nodes.remove(index))
    }

    pub fn content_height(&self) -> f64 {
        self.nodes.iter().map(|n| n.height).sum()
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Distance from the top of the content to the top of node `key`.
    pub fn node_top(&self, key: u64) -> Option<f64> {
        let mut top = 0.0;
        for n in &self.nodes {
            if n.key == key {
                return Some(top);
            }
            top += n.height;
        }
        None
    }

    fn view<'a>(&'a self, node: &'a SimNode, top: f64) -> Element<'a, u64> {
        let width = if node.width > 0.0 {
            node.width
        } else {
            self.viewport_width
        };
        Element {
            key: &node.key,
            tag: &node.tag,
            rect: Rect::new(0.0, top - self.scroll_offset, width, node.height),
            child_count: node.child_count,
            complete: node.complete,
        }
    }
}

impl ScrollHost<u64> for SimHost {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.scroll_offset,
            self.content_height().max(self.viewport_height),
            self.viewport_height,
        )
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport_width, self.viewport_height)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = self.metrics().clamp_scroll_offset(offset);
    }

    fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    fn set_scroll_left(&mut self, left: f64) {
        self.scroll_left = left.max(0.0);
    }

    fn for_each_element(&self, f: &mut dyn FnMut(Element<'_, u64>)) {
        let mut top = 0.0;
        for node in &self.nodes {
            f(self.view(node, top));
            top += node.height;
        }
    }

    fn element(&self, key: &u64) -> Option<Element<'_, u64>> {
        let top = self.node_top(*key)?;
        let node = self.node(*key)?;
        Some(self.view(node, top))
    }
}
