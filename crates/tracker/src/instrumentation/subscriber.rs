//! Following the DOM mutation stream.
//!
//! Every update is forwarded to the wrapped DOM first so that the tracker
//! reacts to the page as it now is. Removals are the exception: proxies are
//! dropped while their nodes still exist, so tags can be cleared and the
//! subtree walked. A removal the DOM would refuse is rejected up front and
//! leaves every proxy in place.

use super::PageInstrumentation;
use crate::category::{Category, ID_ATTR};
use crate::classify::{classify, is_password};
use crate::notify::NotificationSink;
use crate::walk;
use anyhow::{Result, bail};
use dom::{DOMSubscriber, DOMUpdate, NodeKey, PageDom};
use log::trace;

/// What the tracker does after an update reached the DOM.
enum Reaction {
    Inserted(NodeKey),
    TextChanged(NodeKey),
    Reclassify(NodeKey),
    Refresh(NodeKey),
    Removed(Option<u32>),
    DocumentEnded,
    Nothing,
}

impl<D, S> DOMSubscriber for PageInstrumentation<D, S>
where
    D: PageDom + DOMSubscriber,
    S: NotificationSink,
{
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        let reaction = match &update {
            DOMUpdate::InsertElement { node, .. } => Reaction::Inserted(*node),
            DOMUpdate::InsertText { parent, .. } => Reaction::TextChanged(*parent),
            DOMUpdate::SetAttr { node, name, .. } => match name.as_str() {
                "href" | "type" | "contenteditable" => Reaction::Reclassify(*node),
                "value" => Reaction::Refresh(*node),
                _ => Reaction::Nothing,
            },
            DOMUpdate::RemoveNode { node } => {
                if *node == self.host.dom.root() || !self.host.dom.contains(*node) {
                    bail!("cannot remove node {node:?}");
                }
                Reaction::Removed(self.forget_subtree(*node))
            }
            DOMUpdate::EndOfDocument => Reaction::DocumentEnded,
        };
        self.host.dom.apply_update(update)?;

        match reaction {
            Reaction::Inserted(node) => {
                let enclosing = self.adopt_into_fixed(node);
                self.classify_subtree(node);
                if let Some(id) = enclosing {
                    self.update_fixed(id);
                }
            }
            Reaction::TextChanged(parent) => {
                let owner = walk::self_and_ancestors(&self.host.dom, parent)
                    .find(|node| self.host.dom.attribute(*node, ID_ATTR).is_some());
                if let Some(node) = owner {
                    self.refresh_node(node);
                }
            }
            Reaction::Reclassify(node) => self.reclassify(node),
            Reaction::Refresh(node) => {
                if self.host.dom.attribute(node, ID_ATTR).is_some() {
                    self.refresh_node(node);
                }
            }
            Reaction::Removed(enclosing) => {
                if let Some(id) = enclosing {
                    self.update_fixed(id);
                }
            }
            Reaction::DocumentEnded => {
                trace!("document ended, refreshing");
                self.refresh_all();
            }
            Reaction::Nothing => {}
        }
        Ok(())
    }
}

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    /// Bring the tracked proxy on `node` in line with its current attributes.
    /// A proxy whose category or password flag no longer holds is replaced,
    /// so the host sees a removal followed by a fresh `add`.
    fn reclassify(&mut self, node: NodeKey) {
        let wanted = classify(&self.host.dom, node).category;
        let password = wanted == Some(Category::TextInput) && is_password(&self.host.dom, node);
        if let Some((category, id)) = self.tracked_at(node) {
            let current = self.tracked[category]
                .get(id)
                .is_some_and(|proxy| proxy.password() == password);
            if wanted == Some(category) && current {
                return;
            }
            trace!("node {} no longer matches {} {id}", node.0, category.label());
            self.remove_tracked(category, id);
        }
        if let Some(category) = wanted {
            self.create_tracked(category, node);
        }
    }

    fn update_fixed(&mut self, id: u32) {
        if let Some(element) = self.fixed.get_mut(id) {
            element.update_rects(&mut self.host.scope());
        }
    }
}
