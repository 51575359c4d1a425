//! Proxy objects mirroring tracked DOM nodes.

mod fixed;
mod overflow;
mod tracked_node;

pub use fixed::FixedElement;
pub use overflow::{OverflowContainer, scroll_delta};
pub use tracked_node::TrackedNode;

use crate::config::TrackerConfig;
use crate::geometry::{adjust_rect_to_zoom, subtract_scroll_offset};
use crate::notify::{self, Notification, NotificationSink};
use dom::{NodeKey, PageDom, Rect};

/// Everything a proxy needs from its page while recomputing state.
pub struct HostScope<'page> {
    pub dom: &'page mut dyn PageDom,
    pub sink: &'page mut dyn NotificationSink,
    pub config: &'page TrackerConfig,
}

impl<'page> HostScope<'page> {
    pub fn new(
        dom: &'page mut dyn PageDom,
        sink: &'page mut dyn NotificationSink,
        config: &'page TrackerConfig,
    ) -> Self {
        Self { dom, sink, config }
    }

    pub fn emit(&mut self, notification: &Notification) {
        notify::emit(&mut *self.sink, notification);
    }

    /// Page zoom, falling back to the configured default.
    pub fn zoom(&self) -> f64 {
        self.dom.zoom_factor().unwrap_or(self.config.default_zoom)
    }

    /// Map a DOM rect into the host's coordinate space.
    pub fn to_screen(&self, rect: &Rect, fixed: bool) -> Rect {
        let zoomed = adjust_rect_to_zoom(rect, self.zoom());
        if fixed {
            subtract_scroll_offset(&zoomed, self.dom.page_scroll())
        } else {
            zoomed
        }
    }

    /// Client rects of `node` in host coordinates.
    pub fn screen_rects(&self, node: NodeKey, fixed: bool) -> Vec<Rect> {
        self.dom
            .client_rects(node)
            .iter()
            .map(|rect| self.to_screen(rect, fixed))
            .collect()
    }

    /// Bounding box of `node` in host coordinates.
    pub fn screen_bounds(&self, node: NodeKey, fixed: bool) -> Rect {
        self.to_screen(&self.dom.bounding_client_rect(node), fixed)
    }
}
