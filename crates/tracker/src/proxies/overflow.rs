use super::HostScope;
use crate::category::OVERFLOW_ID_ATTR;
use crate::classify::is_inside_fixed;
use crate::config::MAX_SCROLL_STEP;
use crate::geometry::compare_rect_lists;
use crate::notify::{Notification, OverflowChange};
use dom::{NodeKey, PageDom, Rect, ScrollOffset, Size};
use log::debug;

/// Proxy for an element that clips its content and can be scrolled by gaze.
#[derive(Debug, Clone)]
pub struct OverflowContainer {
    node: NodeKey,
    id: u32,
    rects: Option<Vec<Rect>>,
    fixed: bool,
    max_scroll: ScrollOffset,
}

impl OverflowContainer {
    pub fn new(node: NodeKey, id: u32, scope: &mut HostScope<'_>) -> Self {
        scope
            .dom
            .set_attribute(node, OVERFLOW_ID_ATTR, &id.to_string());
        let fixed = is_inside_fixed(&*scope.dom, node);
        Self {
            node,
            id,
            rects: Some(scope.screen_rects(node, fixed)),
            fixed,
            max_scroll: max_scroll_of(&*scope.dom, node),
        }
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fixed(&self) -> bool {
        self.fixed
    }

    pub fn max_scroll(&self) -> ScrollOffset {
        self.max_scroll
    }

    pub fn get_rects(&self) -> Vec<Rect> {
        self.rects.clone().unwrap_or_default()
    }

    pub fn added(&self) -> Notification {
        let rect = self
            .get_rects()
            .into_iter()
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_default();
        Notification::OverflowAdded {
            id: self.id,
            fixed: self.fixed,
            rect,
            max_scroll: self.max_scroll,
        }
    }

    pub fn update_rects(&mut self, scope: &mut HostScope<'_>) -> bool {
        self.max_scroll = max_scroll_of(&*scope.dom, self.node);
        let rects = scope.screen_rects(self.node, self.fixed);
        if compare_rect_lists(self.rects.as_deref(), Some(rects.as_slice())) {
            return false;
        }
        self.rects = Some(rects.clone());
        scope.emit(&Notification::OverflowUpdated {
            id: self.id,
            change: OverflowChange::Rects(rects),
        });
        true
    }

    pub fn set_fixed(&mut self, fixed: bool, scope: &mut HostScope<'_>) -> bool {
        if self.fixed == fixed {
            return false;
        }
        self.fixed = fixed;
        scope.emit(&Notification::OverflowUpdated {
            id: self.id,
            change: OverflowChange::Fixed(fixed),
        });
        self.update_rects(scope);
        true
    }

    /// Scroll toward whichever edges the gaze point is close to and return
    /// the resulting scroll position. Descendants are not refreshed here.
    pub fn scroll(&mut self, gaze_x: f64, gaze_y: f64, scope: &mut HostScope<'_>) -> ScrollOffset {
        let zoom = scope.zoom();
        let bounds = scope.screen_bounds(self.node, self.fixed);
        let client = scope.dom.client_size(self.node);
        let visible = Size::new(client.width * zoom, client.height * zoom);
        let (delta_x, delta_y) = scroll_delta(
            &bounds,
            visible,
            gaze_x,
            gaze_y,
            scope.config.scroll_band,
            scope.config.scroll_step.min(MAX_SCROLL_STEP),
        );

        let current = scope.dom.scroll_position(self.node);
        if delta_x == 0.0 && delta_y == 0.0 {
            return current;
        }
        scope.dom.set_scroll_position(
            self.node,
            ScrollOffset::new(current.left + delta_x, current.top + delta_y),
        );
        let position = scope.dom.scroll_position(self.node);
        debug!(
            "overflow {} scrolled by ({delta_x}, {delta_y}) to ({}, {})",
            self.id, position.left, position.top
        );
        position
    }

    pub fn untag(&self, dom: &mut dyn PageDom) {
        dom.remove_attribute(self.node, OVERFLOW_ID_ATTR);
    }
}

fn max_scroll_of(dom: &dyn PageDom, node: NodeKey) -> ScrollOffset {
    let scroll = dom.scroll_size(node);
    let client = dom.client_size(node);
    ScrollOffset::new(
        (scroll.width - client.width).max(0.0),
        (scroll.height - client.height).max(0.0),
    )
}

/// Gaze scroll deltas for a container occupying `bounds`.
///
/// Each axis has an edge band of `band` times half the visible size. Inside
/// the band the delta grows linearly toward the edge, up to `step`; it is
/// negative near the left/top edge and positive near the right/bottom edge.
pub fn scroll_delta(
    bounds: &Rect,
    visible: Size,
    gaze_x: f64,
    gaze_y: f64,
    band: f64,
    step: f64,
) -> (f64, f64) {
    let threshold_x = visible.width / 2.0 * band;
    let threshold_y = visible.height / 2.0 * band;
    (
        axis_delta(gaze_x, bounds.left, bounds.right, threshold_x, step),
        axis_delta(gaze_y, bounds.top, bounds.bottom, threshold_y, step),
    )
}

fn axis_delta(gaze: f64, start: f64, end: f64, threshold: f64, step: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    let from_start = gaze - start;
    let from_end = end - gaze;
    if (0.0..threshold).contains(&from_start) {
        -step * (1.0 - from_start / threshold)
    } else if (0.0..threshold).contains(&from_end) {
        step * (1.0 - from_end / threshold)
    } else {
        0.0
    }
}
