//! In-process page model backed by an `indextree` arena.
//!
//! `MemoryDom` stores what a layout engine would have computed for each node
//! (document-space border boxes, computed style, scroll extents) and answers
//! the [`PageDom`] queries from that. Scrolling a container shifts the client
//! rects of everything beneath it, the same way a browser reports them.

use crate::{
    ComputedStyle, DOMSubscriber, DOMUpdate, NodeKey, PageDom, Rect, ScrollOffset, Size,
};
use anyhow::{Result, anyhow, bail};
use indextree::{Arena, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    pub style: ComputedStyle,
    /// Border boxes in document coordinates, one per fragment.
    pub layout: Vec<Rect>,
    pub scroll: ScrollOffset,
    pub scroll_size: Option<Size>,
    pub client_size: Option<Size>,
    pub value: Option<String>,
}

impl MemoryNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            attrs: SmallVec::new(),
            style: ComputedStyle::default(),
            layout: Vec::new(),
            scroll: ScrollOffset::default(),
            scroll_size: None,
            client_size: None,
            value: None,
        }
    }
}

#[derive(Debug)]
pub struct MemoryDom {
    arena: Arena<MemoryNode>,
    root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    next_key: u64,
    zoom: Option<f64>,
    page_scroll: ScrollOffset,
    submitted: Vec<NodeKey>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(MemoryNode::new(NodeKey::ROOT, NodeKind::Document));
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            ids,
            next_key: 1,
            zoom: None,
            page_scroll: ScrollOffset::default(),
            submitted: Vec::new(),
        }
    }

    fn id_of(&self, key: NodeKey) -> Option<NodeId> {
        self.ids.get(&key).copied()
    }

    /// Reserve a fresh key, for hosts that announce nodes through the
    /// mutation stream before inserting them.
    ///
    /// # Errors
    /// Returns an error once the key space is used up.
    pub fn mint_key(&mut self) -> Result<NodeKey> {
        let key = NodeKey(self.next_key);
        if self.ids.contains_key(&key) {
            bail!("node keys exhausted");
        }
        self.next_key = self.next_key.saturating_add(1);
        Ok(key)
    }

    /// Attach a new node under `parent` at child position `pos` (appending when out of range).
    fn attach(&mut self, parent: NodeKey, data: MemoryNode, pos: usize) -> Result<()> {
        let key = data.key;
        if self.ids.contains_key(&key) {
            bail!("node {key:?} already exists");
        }
        let parent_id = self
            .id_of(parent)
            .ok_or_else(|| anyhow!("unknown parent {parent:?} for {key:?}"))?;
        let child = self.arena.new_node(data);
        let sibling = parent_id.children(&self.arena).nth(pos);
        match sibling {
            Some(next) => next.checked_insert_before(child, &mut self.arena),
            None => parent_id.checked_append(child, &mut self.arena),
        }
        .map_err(|err| anyhow!("cannot attach {key:?} under {parent:?}: {err}"))?;
        self.ids.insert(key, child);
        self.next_key = self.next_key.max(key.0.saturating_add(1));
        Ok(())
    }

    /// Append a new element and return its key.
    ///
    /// # Errors
    /// Returns an error if `parent` is unknown.
    pub fn create_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        let key = self.mint_key()?;
        self.insert_element(parent, key, tag, usize::MAX)?;
        Ok(key)
    }

    /// Append a new text node and return its key.
    ///
    /// # Errors
    /// Returns an error if `parent` is unknown.
    pub fn create_text(&mut self, parent: NodeKey, text: &str) -> Result<NodeKey> {
        let key = self.mint_key()?;
        self.insert_text(parent, key, text, usize::MAX)?;
        Ok(key)
    }

    /// Insert an element under a host-chosen key.
    ///
    /// # Errors
    /// Returns an error if `parent` is unknown or `node` is already present.
    pub fn insert_element(
        &mut self,
        parent: NodeKey,
        node: NodeKey,
        tag: &str,
        pos: usize,
    ) -> Result<()> {
        let kind = NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        };
        self.attach(parent, MemoryNode::new(node, kind), pos)
    }

    /// Insert a text node under a host-chosen key.
    ///
    /// # Errors
    /// Returns an error if `parent` is unknown or `node` is already present.
    pub fn insert_text(&mut self, parent: NodeKey, node: NodeKey, text: &str, pos: usize) -> Result<()> {
        let kind = NodeKind::Text {
            text: text.to_owned(),
        };
        self.attach(parent, MemoryNode::new(node, kind), pos)
    }

    /// Detach `node` and its whole subtree.
    ///
    /// # Errors
    /// Returns an error for the document node or an unknown key.
    pub fn remove(&mut self, node: NodeKey) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("the document node cannot be removed");
        }
        let id = self
            .id_of(node)
            .ok_or_else(|| anyhow!("cannot remove unknown node {node:?}"))?;
        let doomed: Vec<NodeKey> = id
            .descendants(&self.arena)
            .filter_map(|desc| self.arena.get(desc).map(|entry| entry.get().key))
            .collect();
        id.remove_subtree(&mut self.arena);
        for key in doomed {
            self.ids.remove(&key);
        }
        Ok(())
    }

    pub fn node(&self, key: NodeKey) -> Option<&MemoryNode> {
        self.id_of(key)
            .and_then(|id| self.arena.get(id))
            .map(|entry| entry.get())
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut MemoryNode> {
        let id = self.id_of(key)?;
        self.arena.get_mut(id).map(|entry| entry.get_mut())
    }

    /// Replace the layout boxes of `node`, in document coordinates.
    pub fn set_layout(&mut self, node: NodeKey, rects: Vec<Rect>) {
        if let Some(entry) = self.node_mut(node) {
            entry.layout = rects;
        }
    }

    pub fn set_style(&mut self, node: NodeKey, style: ComputedStyle) {
        if let Some(entry) = self.node_mut(node) {
            entry.style = style;
        }
    }

    /// Record the scrollable content size and the visible size of a container.
    pub fn set_scroll_extent(&mut self, node: NodeKey, scroll_size: Size, client_size: Size) {
        if let Some(entry) = self.node_mut(node) {
            entry.scroll_size = Some(scroll_size);
            entry.client_size = Some(client_size);
        }
    }

    pub fn set_zoom(&mut self, zoom: Option<f64>) {
        self.zoom = zoom;
    }

    pub fn set_page_scroll(&mut self, offset: ScrollOffset) {
        self.page_scroll = offset;
    }

    /// Forms submitted so far, in submission order.
    pub fn submitted_forms(&self) -> &[NodeKey] {
        &self.submitted
    }

    /// Sum of the scroll offsets of every ancestor of `id`.
    fn ancestor_scroll(&self, id: NodeId) -> ScrollOffset {
        id.ancestors(&self.arena)
            .skip(1)
            .filter_map(|ancestor| self.arena.get(ancestor))
            .fold(ScrollOffset::default(), |acc, entry| {
                let scroll = entry.get().scroll;
                ScrollOffset::new(acc.left + scroll.left, acc.top + scroll.top)
            })
    }
}

impl PageDom for MemoryDom {
    fn contains(&self, node: NodeKey) -> bool {
        self.ids.contains_key(&node)
    }

    fn root(&self) -> NodeKey {
        self.arena
            .get(self.root)
            .map_or(NodeKey::ROOT, |entry| entry.get().key)
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        let id = self.id_of(node)?;
        let parent = self.arena.get(id)?.parent()?;
        self.arena.get(parent).map(|entry| entry.get().key)
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.id_of(node) else {
            return Vec::new();
        };
        id.children(&self.arena)
            .filter_map(|child| self.arena.get(child).map(|entry| entry.get().key))
            .collect()
    }

    fn tag_name(&self, node: NodeKey) -> Option<String> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) {
        let Some(entry) = self.node_mut(node) else {
            return;
        };
        if let Some(slot) = entry.attrs.iter_mut().find(|(attr, _)| attr == name) {
            value.clone_into(&mut slot.1);
        } else {
            entry.attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    fn remove_attribute(&mut self, node: NodeKey, name: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry.attrs.retain(|(attr, _)| attr != name);
        }
    }

    fn computed_style(&self, node: NodeKey) -> ComputedStyle {
        self.node(node)
            .map(|entry| entry.style)
            .unwrap_or_default()
    }

    fn client_rects(&self, node: NodeKey) -> Vec<Rect> {
        let Some(id) = self.id_of(node) else {
            return Vec::new();
        };
        let Some(entry) = self.arena.get(id) else {
            return Vec::new();
        };
        let scroll = self.ancestor_scroll(id);
        entry
            .get()
            .layout
            .iter()
            .map(|rect| rect.translate(-scroll.left, -scroll.top))
            .collect()
    }

    fn bounding_client_rect(&self, node: NodeKey) -> Rect {
        self.client_rects(node)
            .iter()
            .copied()
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_default()
    }

    fn zoom_factor(&self) -> Option<f64> {
        self.zoom
    }

    fn page_scroll(&self) -> ScrollOffset {
        self.page_scroll
    }

    fn scroll_position(&self, node: NodeKey) -> ScrollOffset {
        self.node(node).map(|entry| entry.scroll).unwrap_or_default()
    }

    fn set_scroll_position(&mut self, node: NodeKey, offset: ScrollOffset) {
        let scroll = self.scroll_size(node);
        let client = self.client_size(node);
        let max_left = (scroll.width - client.width).max(0.0);
        let max_top = (scroll.height - client.height).max(0.0);
        if let Some(entry) = self.node_mut(node) {
            entry.scroll = ScrollOffset::new(
                offset.left.clamp(0.0, max_left),
                offset.top.clamp(0.0, max_top),
            );
        }
    }

    fn scroll_size(&self, node: NodeKey) -> Size {
        self.node(node)
            .and_then(|entry| entry.scroll_size)
            .unwrap_or_else(|| self.client_size(node))
    }

    fn client_size(&self, node: NodeKey) -> Size {
        if let Some(size) = self.node(node).and_then(|entry| entry.client_size) {
            return size;
        }
        let rect = self.bounding_client_rect(node);
        Size::new(rect.width(), rect.height())
    }

    fn value(&self, node: NodeKey) -> Option<String> {
        self.node(node)?
            .value
            .clone()
            .or_else(|| self.attribute(node, "value"))
    }

    fn set_value(&mut self, node: NodeKey, value: &str) {
        if let Some(entry) = self.node_mut(node) {
            entry.value = Some(value.to_owned());
        }
    }

    fn text_content(&self, node: NodeKey) -> String {
        let Some(id) = self.id_of(node) else {
            return String::new();
        };
        id.descendants(&self.arena)
            .filter_map(|desc| self.arena.get(desc))
            .filter_map(|entry| match &entry.get().kind {
                NodeKind::Text { text } => Some(text.as_str()),
                NodeKind::Document | NodeKind::Element { .. } => None,
            })
            .collect()
    }

    fn set_text_content(&mut self, node: NodeKey, text: &str) {
        for child in self.children(node) {
            if let Err(err) = self.remove(child) {
                log::warn!("set_text_content: {err}");
            }
        }
        if let Err(err) = self.create_text(node, text) {
            log::warn!("set_text_content: {err}");
        }
    }

    fn submit_form(&mut self, form: NodeKey) -> Result<()> {
        match self.tag_name(form).as_deref() {
            Some("form") => {
                self.submitted.push(form);
                Ok(())
            }
            _ => Err(anyhow!("{form:?} is not a form element")),
        }
    }
}

impl DOMSubscriber for MemoryDom {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        match update {
            DOMUpdate::InsertElement {
                parent,
                node,
                tag,
                pos,
            } => self.insert_element(parent, node, &tag, pos),
            DOMUpdate::InsertText {
                parent,
                node,
                text,
                pos,
            } => self.insert_text(parent, node, &text, pos),
            DOMUpdate::SetAttr { node, name, value } => {
                if !self.contains(node) {
                    bail!("SetAttr on unknown node {node:?}");
                }
                self.set_attribute(node, &name, &value);
                Ok(())
            }
            DOMUpdate::RemoveNode { node } => self.remove(node),
            DOMUpdate::EndOfDocument => Ok(()),
        }
    }
}
