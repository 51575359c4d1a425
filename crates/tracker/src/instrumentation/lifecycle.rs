//! Creation and removal of proxies, and document classification.

use super::{PageInstrumentation, parse_id};
use crate::category::{Category, FIXED_ELEMENT_ATTR, FIXED_ID_ATTR, ID_ATTR, OVERFLOW_ID_ATTR};
use crate::classify::{classify, is_inside_fixed};
use crate::error::{TrackError, report};
use crate::notify::{NotificationSink, Notification};
use crate::proxies::{FixedElement, OverflowContainer, TrackedNode};
use crate::walk;
use dom::{NodeKey, PageDom};
use log::{debug, info};

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    /// Start tracking `node` as `category` and announce it to the host.
    ///
    /// A node that already carries an id tag is left alone and its existing
    /// id is returned, so repeated classification never duplicates a proxy.
    pub fn create_tracked(&mut self, category: Category, node: NodeKey) -> Option<u32> {
        if !self.host.dom.is_element(node) {
            report(&TrackError::NotAnElement(node));
            return None;
        }
        if let Some(raw) = self.host.dom.attribute(node, ID_ATTR) {
            return existing_id(&raw);
        }

        let mut scope = self.host.scope();
        let registry = &mut self.tracked[category];
        let id = registry.insert_with(|id| TrackedNode::new(node, category, id, &mut scope));
        if let Some(proxy) = registry.get(id) {
            let added = proxy.added(&scope);
            scope.emit(&added);
        }
        debug!("tracking {} {id} at node {}", category.label(), node.0);
        Some(id)
    }

    pub fn create_text_input(&mut self, node: NodeKey) -> Option<u32> {
        self.create_tracked(Category::TextInput, node)
    }

    pub fn create_link(&mut self, node: NodeKey) -> Option<u32> {
        self.create_tracked(Category::Link, node)
    }

    /// Stop tracking a text input or link. The DOM node itself is untouched
    /// apart from losing its tags.
    pub fn remove_tracked(&mut self, category: Category, id: u32) -> bool {
        let Some(proxy) = self.tracked[category].remove(id) else {
            report(&TrackError::UnknownId {
                registry: category.label(),
                id,
            });
            return false;
        };
        proxy.untag(&mut self.host.dom);
        self.host
            .scope()
            .emit(&Notification::NodeRemoved { category, id });
        true
    }

    /// Register a clipping container and attach the tracked nodes inside it.
    pub fn create_overflow_container(&mut self, node: NodeKey) -> Option<u32> {
        if !self.host.dom.is_element(node) {
            report(&TrackError::NotAnElement(node));
            return None;
        }
        if let Some(raw) = self.host.dom.attribute(node, OVERFLOW_ID_ATTR) {
            return existing_id(&raw);
        }

        let mut scope = self.host.scope();
        let id = self
            .overflows
            .insert_with(|id| OverflowContainer::new(node, id, &mut scope));
        if let Some(proxy) = self.overflows.get(id) {
            scope.emit(&proxy.added());
        }
        debug!("tracking overflow container {id} at node {}", node.0);

        for descendant in walk::descendants(&self.host.dom, node) {
            let Some((category, tracked_id)) = self.tracked_at(descendant) else {
                continue;
            };
            let mut scope = self.host.scope();
            if let Some(proxy) = self.tracked[category].get_mut(tracked_id) {
                proxy.search_overflow_ancestor(&*scope.dom);
                proxy.update_rects(&mut scope);
            }
        }
        Some(id)
    }

    /// Unregister a container. Nodes that were clipped by it stop being
    /// clipped and are re-measured.
    pub fn remove_overflow_container(&mut self, id: u32) -> bool {
        let Some(proxy) = self.overflows.remove(id) else {
            report(&TrackError::UnknownId {
                registry: "overflow container",
                id,
            });
            return false;
        };
        proxy.untag(&mut self.host.dom);
        let container = proxy.node();

        let mut scope = self.host.scope();
        scope.emit(&Notification::OverflowRemoved { id });
        for category in Category::ALL {
            for (_, tracked) in self.tracked[category].iter_mut() {
                if tracked.overflow_ancestor() == Some(container) {
                    tracked.clear_overflow_ancestor();
                    tracked.update_rects(&mut scope);
                }
            }
        }
        true
    }

    /// Register a fixed element, cascade the fixed state to every proxy
    /// inside it and post its first cover.
    pub fn create_fixed_element(&mut self, node: NodeKey) -> Option<u32> {
        if !self.host.dom.is_element(node) {
            report(&TrackError::NotAnElement(node));
            return None;
        }
        if let Some(raw) = self.host.dom.attribute(node, FIXED_ELEMENT_ATTR) {
            return existing_id(&raw);
        }

        let id = {
            let mut scope = self.host.scope();
            self.fixed
                .insert_with(|id| FixedElement::new(node, id, &mut scope))
        };
        debug!("tracking fixed element {id} at node {}", node.0);

        for descendant in walk::descendants(&self.host.dom, node) {
            self.refresh_fixed_state(descendant, true);
        }
        if let Some(proxy) = self.fixed.get_mut(id) {
            proxy.update_rects(&mut self.host.scope());
        }
        Some(id)
    }

    /// Unregister a fixed element, recompute the fixed state of everything
    /// that was inside it and refresh the whole page.
    pub fn remove_fixed_element(&mut self, id: u32) -> bool {
        let Some(proxy) = self.fixed.remove(id) else {
            report(&TrackError::UnknownId {
                registry: "fixed element",
                id,
            });
            return false;
        };
        proxy.untag(&mut self.host.dom);
        self.host
            .scope()
            .emit(&Notification::FixedRemoved { id });

        for descendant in walk::descendants(&self.host.dom, proxy.node()) {
            let fixed = is_inside_fixed(&self.host.dom, descendant);
            self.refresh_fixed_state(descendant, fixed);
        }
        self.refresh_all();
        true
    }

    /// Push a fixed flag to whichever proxies live on `node`.
    fn refresh_fixed_state(&mut self, node: NodeKey, fixed: bool) {
        let tracked = self.tracked_at(node);
        let overflow = self.overflow_at(node);
        let mut scope = self.host.scope();
        if let Some((category, id)) = tracked
            && let Some(proxy) = self.tracked[category].get_mut(id)
        {
            proxy.set_fixed(fixed, &mut scope);
        }
        if let Some(id) = overflow
            && let Some(proxy) = self.overflows.get_mut(id)
        {
            proxy.set_fixed(fixed, &mut scope);
        }
    }

    /// Classify `root` and everything below it, creating proxies for each
    /// match. Fixed elements go first so that the proxies created after them
    /// start out with the right fixed state, then overflow containers so that
    /// tracked nodes find their clipping ancestor on creation.
    pub fn classify_subtree(&mut self, root: NodeKey) {
        let nodes = walk::subtree(&self.host.dom, root);
        let classes: Vec<_> = nodes
            .iter()
            .map(|node| (*node, classify(&self.host.dom, *node)))
            .collect();

        for (node, class) in &classes {
            if class.fixed {
                self.create_fixed_element(*node);
            }
        }
        for (node, class) in &classes {
            if class.overflow {
                self.create_overflow_container(*node);
            }
        }
        for (node, class) in &classes {
            if let Some(category) = class.category {
                self.create_tracked(category, *node);
            }
        }
    }

    /// Classify the whole document. The host calls this once the page has loaded.
    pub fn scan_document(&mut self) {
        let root = self.host.dom.root();
        self.classify_subtree(root);
        info!(
            "scan complete: {} text inputs, {} links, {} overflow containers, {} fixed elements",
            self.tracked[Category::TextInput].len(),
            self.tracked[Category::Link].len(),
            self.overflows.len(),
            self.fixed.len()
        );
    }

    /// Tag a freshly inserted subtree for the fixed element above it, if any.
    /// Returns that fixed element's id.
    pub(super) fn adopt_into_fixed(&mut self, node: NodeKey) -> Option<u32> {
        let id = walk::ancestors(&self.host.dom, node).find_map(|ancestor| self.fixed_at(ancestor))?;
        if let Some(proxy) = self.fixed.get(id) {
            proxy.adopt(&mut self.host.dom, node);
        }
        Some(id)
    }

    /// Drop every proxy living on `root` or below it and untag the nodes.
    ///
    /// Returns the id of the fixed element enclosing `root`, whose cover needs
    /// rebuilding once the nodes are gone.
    pub fn forget_subtree(&mut self, root: NodeKey) -> Option<u32> {
        let enclosing = self
            .host
            .dom
            .attribute(root, FIXED_ID_ATTR)
            .and_then(|raw| parse_id(&raw).ok())
            .filter(|id| self.fixed.get(*id).is_some());

        let nodes = walk::subtree(&self.host.dom, root);
        for node in &nodes {
            if let Some((category, id)) = self.tracked_at(*node) {
                self.remove_tracked(category, id);
            }
            if let Some(id) = self.overflow_at(*node) {
                self.remove_overflow_container(id);
            }
        }
        for node in &nodes {
            if let Some(id) = self.fixed_at(*node) {
                self.remove_fixed_element(id);
            }
        }
        enclosing
    }
}

/// Id of a node that is already tagged.
fn existing_id(raw: &str) -> Option<u32> {
    parse_id(raw).map_err(|err| report(&err)).ok()
}
