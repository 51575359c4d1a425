use super::HostScope;
use crate::category::{FIXED_ELEMENT_ATTR, FIXED_ID_ATTR};
use crate::geometry::{compare_rect_lists, merge_into_cover};
use crate::notify::Notification;
use crate::walk;
use dom::{NodeKey, PageDom, Rect};

/// Proxy for a `position: fixed` element.
///
/// Reports an approximate cover of the element and everything inside it,
/// so the host can tell which screen area does not move with the page.
#[derive(Debug, Clone)]
pub struct FixedElement {
    node: NodeKey,
    id: u32,
    rects: Option<Vec<Rect>>,
}

impl FixedElement {
    /// Tag `node` and its current descendants. Nothing is measured or posted
    /// until the first [`Self::update_rects`].
    pub fn new(node: NodeKey, id: u32, scope: &mut HostScope<'_>) -> Self {
        let proxy = Self {
            node,
            id,
            rects: None,
        };
        scope
            .dom
            .set_attribute(node, FIXED_ELEMENT_ATTR, &id.to_string());
        let descendants = walk::descendants(&*scope.dom, node);
        proxy.tag(&mut *scope.dom, descendants);
        proxy
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn get_rects(&self) -> Vec<Rect> {
        self.rects.clone().unwrap_or_default()
    }

    /// Point a subtree inserted below this element back at it.
    pub fn adopt(&self, dom: &mut dyn PageDom, root: NodeKey) {
        let nodes = walk::subtree(&*dom, root);
        self.tag(dom, nodes);
    }

    fn tag(&self, dom: &mut dyn PageDom, nodes: Vec<NodeKey>) {
        let value = self.id.to_string();
        for node in nodes {
            dom.set_attribute(node, FIXED_ID_ATTR, &value);
        }
    }

    /// Rebuild the cover and post `#fixElem#add` if it changed.
    pub fn update_rects(&mut self, scope: &mut HostScope<'_>) -> bool {
        let mut cover = scope.screen_rects(self.node, true);
        for node in walk::descendants(&*scope.dom, self.node) {
            for rect in scope.screen_rects(node, true) {
                merge_into_cover(&mut cover, rect);
            }
        }
        if compare_rect_lists(self.rects.as_deref(), Some(cover.as_slice())) {
            return false;
        }
        self.rects = Some(cover.clone());
        scope.emit(&Notification::FixedAdded {
            id: self.id,
            rects: cover,
        });
        true
    }

    /// Drop the element tag and every descendant tag that still points here.
    pub fn untag(&self, dom: &mut dyn PageDom) {
        dom.remove_attribute(self.node, FIXED_ELEMENT_ATTR);
        let value = self.id.to_string();
        for node in walk::descendants(&*dom, self.node) {
            if dom.attribute(node, FIXED_ID_ATTR).as_deref() == Some(value.as_str()) {
                dom.remove_attribute(node, FIXED_ID_ATTR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::notify::RecordingSink;
    use dom::{MemoryDom, ScrollOffset};

    #[test]
    fn cover_skips_contained_descendants() {
        let mut dom = MemoryDom::new();
        let bar = dom.create_element(NodeKey::ROOT, "nav").unwrap();
        let inner = dom.create_element(bar, "a").unwrap();
        let sticking_out = dom.create_element(bar, "div").unwrap();
        dom.set_layout(bar, vec![Rect::from_origin_size(0.0, 0.0, 100.0, 20.0)]);
        dom.set_layout(inner, vec![Rect::from_origin_size(5.0, 5.0, 10.0, 10.0)]);
        dom.set_layout(sticking_out, vec![Rect::from_origin_size(0.0, 10.0, 50.0, 40.0)]);

        let mut sink = RecordingSink::new();
        let config = TrackerConfig::default();
        let mut scope = HostScope::new(&mut dom, &mut sink, &config);
        let mut fixed = FixedElement::new(bar, 3, &mut scope);
        assert!(fixed.update_rects(&mut scope));
        assert!(!fixed.update_rects(&mut scope));
        drop(scope);

        assert_eq!(
            fixed.get_rects(),
            vec![
                Rect::new(0.0, 0.0, 20.0, 100.0),
                Rect::new(10.0, 0.0, 50.0, 50.0),
            ]
        );
        assert_eq!(sink.lines(), ["#fixElem#add#3#0;0;20;100;10;0;50;50#"]);
        assert_eq!(dom.attribute(inner, FIXED_ID_ATTR).as_deref(), Some("3"));
    }

    #[test]
    fn cover_is_in_viewport_coordinates() {
        let mut dom = MemoryDom::new();
        let bar = dom.create_element(NodeKey::ROOT, "header").unwrap();
        dom.set_layout(bar, vec![Rect::from_origin_size(0.0, 400.0, 100.0, 20.0)]);
        dom.set_page_scroll(ScrollOffset::new(0.0, 400.0));

        let mut sink = RecordingSink::new();
        let config = TrackerConfig::default();
        let mut scope = HostScope::new(&mut dom, &mut sink, &config);
        let mut fixed = FixedElement::new(bar, 0, &mut scope);
        fixed.update_rects(&mut scope);
        assert_eq!(fixed.get_rects(), vec![Rect::new(0.0, 0.0, 20.0, 100.0)]);
    }

    #[test]
    fn untag_leaves_foreign_tags_alone() {
        let mut dom = MemoryDom::new();
        let outer = dom.create_element(NodeKey::ROOT, "div").unwrap();
        let inner = dom.create_element(outer, "div").unwrap();
        let leaf = dom.create_element(inner, "span").unwrap();

        let mut sink = RecordingSink::new();
        let config = TrackerConfig::default();
        let mut scope = HostScope::new(&mut dom, &mut sink, &config);
        let outer_proxy = FixedElement::new(outer, 0, &mut scope);
        let inner_proxy = FixedElement::new(inner, 1, &mut scope);
        outer_proxy.untag(&mut *scope.dom);
        drop(scope);

        assert_eq!(dom.attribute(outer, FIXED_ELEMENT_ATTR), None);
        assert_eq!(dom.attribute(inner, FIXED_ID_ATTR), None);
        assert_eq!(dom.attribute(leaf, FIXED_ID_ATTR).as_deref(), Some("1"));
        assert_eq!(inner_proxy.id(), 1);
    }
}
