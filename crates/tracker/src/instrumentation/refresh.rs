//! Re-measuring proxies after layout, scroll or zoom changes.

use super::PageInstrumentation;
use crate::category::Category;
use crate::classify::is_inside_fixed;
use crate::error::{TrackError, report};
use crate::notify::NotificationSink;
use crate::proxies::HostScope;
use crate::proxies::TrackedNode;
use crate::walk;
use dom::{NodeKey, PageDom, Rect, ScrollOffset};
use log::trace;

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    /// Recompute every proxy on the page. The host calls this once per frame;
    /// only proxies whose state moved post anything.
    pub fn refresh_all(&mut self) {
        let mut scope = self.host.scope();
        for (_, container) in self.overflows.iter_mut() {
            let fixed = is_inside_fixed(&*scope.dom, container.node());
            container.set_fixed(fixed, &mut scope);
            container.update_rects(&mut scope);
        }
        for category in Category::ALL {
            for (_, proxy) in self.tracked[category].iter_mut() {
                refresh_tracked(proxy, &mut scope);
            }
        }
        for (_, element) in self.fixed.iter_mut() {
            element.update_rects(&mut scope);
        }
        trace!("refreshed all proxies");
    }

    /// Recompute the tracked node living on `node`, found through its tags.
    pub fn refresh_node(&mut self, node: NodeKey) -> bool {
        let (category, id) = match self.resolve_node(node) {
            Ok(found) => found,
            Err(err) => {
                report(&err);
                return false;
            }
        };
        let mut scope = self.host.scope();
        self.tracked[category]
            .get_mut(id)
            .is_some_and(|proxy| refresh_tracked(proxy, &mut scope))
    }

    /// Re-post the `add` message of the tracked node living on `node`.
    pub fn notify_node(&mut self, node: NodeKey) -> bool {
        let (category, id) = match self.resolve_node(node) {
            Ok(found) => found,
            Err(err) => {
                report(&err);
                return false;
            }
        };
        let mut scope = self.host.scope();
        let Some(proxy) = self.tracked[category].get(id) else {
            return false;
        };
        let added = proxy.added(&scope);
        scope.emit(&added);
        true
    }

    /// Scroll an overflow container toward the gaze point, then re-measure
    /// everything inside it. Returns the new scroll position.
    pub fn scroll_overflow(&mut self, id: u32, gaze_x: f64, gaze_y: f64) -> Option<ScrollOffset> {
        let Some(container) = self.overflows.get_mut(id) else {
            report(&TrackError::UnknownId {
                registry: "overflow container",
                id,
            });
            return None;
        };
        let node = container.node();
        let position = container.scroll(gaze_x, gaze_y, &mut self.host.scope());
        self.refresh_descendants(node);
        Some(position)
    }

    /// Update the rects of every tracked node and container below `root`,
    /// and the cover of the fixed element around it.
    pub fn refresh_descendants(&mut self, root: NodeKey) {
        for node in walk::descendants(&self.host.dom, root) {
            let tracked = self.tracked_at(node);
            let overflow = self.overflow_at(node);
            let mut scope = self.host.scope();
            if let Some((category, id)) = tracked
                && let Some(proxy) = self.tracked[category].get_mut(id)
            {
                proxy.update_rects(&mut scope);
            }
            if let Some(id) = overflow
                && let Some(proxy) = self.overflows.get_mut(id)
            {
                proxy.update_rects(&mut scope);
            }
        }
        let enclosing = walk::self_and_ancestors(&self.host.dom, root)
            .find_map(|node| self.fixed_at(node));
        if let Some(id) = enclosing
            && let Some(element) = self.fixed.get_mut(id)
        {
            element.update_rects(&mut self.host.scope());
        }
    }

    /// Host-facing rects of a tracked node, clipped to its overflow ancestor.
    pub fn tracked_rects(&mut self, category: Category, id: u32) -> Option<Vec<Rect>> {
        let proxy = self.tracked[category].get(id)?;
        Some(proxy.get_rects(&self.host.scope()))
    }

    pub fn overflow_rects(&self, id: u32) -> Option<Vec<Rect>> {
        self.overflows.get(id).map(|proxy| proxy.get_rects())
    }

    pub fn fixed_rects(&self, id: u32) -> Option<Vec<Rect>> {
        self.fixed.get(id).map(|proxy| proxy.get_rects())
    }
}

/// Full per-node refresh: fixed state, text, then rects (which also
/// re-checks visibility).
fn refresh_tracked(proxy: &mut TrackedNode, scope: &mut HostScope<'_>) -> bool {
    let fixed = is_inside_fixed(&*scope.dom, proxy.node());
    let mut changed = proxy.set_fixed(fixed, scope);
    changed |= proxy.refresh_text(scope);
    changed |= proxy.update_rects(scope);
    changed
}
