use super::HostScope;
use crate::category::{Category, ID_ATTR, TYPE_ATTR};
use crate::classify::{input_type, is_inside_fixed, is_password};
use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::geometry::{clip_rect, compare_rect_lists, intersects};
use crate::notify::{NodeChange, Notification};
use crate::walk;
use dom::{NodeKey, Overflow, PageDom, Rect, Visibility};

/// Proxy for a text input or link.
///
/// Caches the last reported rects and flags so that a recomputation only
/// reaches the host when something actually changed.
#[derive(Debug, Clone)]
pub struct TrackedNode {
    node: NodeKey,
    category: Category,
    id: u32,
    rects: Option<Vec<Rect>>,
    visible: bool,
    fixed: bool,
    /// Clipping ancestor; a weak link resolved through the DOM on every read.
    overflow_ancestor: Option<NodeKey>,
    text: String,
    password: bool,
}

impl TrackedNode {
    /// Tag `node` and take an initial measurement. Nothing is posted; the
    /// caller reports the addition with [`Self::added`].
    pub fn new(node: NodeKey, category: Category, id: u32, scope: &mut HostScope<'_>) -> Self {
        scope.dom.set_attribute(node, ID_ATTR, &id.to_string());
        scope
            .dom
            .set_attribute(node, TYPE_ATTR, &category.code().to_string());

        let dom: &dyn PageDom = &*scope.dom;
        let mut proxy = Self {
            node,
            category,
            id,
            rects: None,
            visible: false,
            fixed: is_inside_fixed(dom, node),
            overflow_ancestor: None,
            text: read_text(dom, node),
            password: category == Category::TextInput && is_password(dom, node),
        };
        proxy.search_overflow_ancestor(dom);
        proxy.visible = proxy.check_visibility(dom, scope.config);
        proxy.rects = Some(scope.screen_rects(node, proxy.fixed));
        proxy
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn fixed(&self) -> bool {
        self.fixed
    }

    pub fn password(&self) -> bool {
        self.password
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn overflow_ancestor(&self) -> Option<NodeKey> {
        self.overflow_ancestor
    }

    /// Last measured rects, before overflow clipping.
    pub fn cached_rects(&self) -> Option<&[Rect]> {
        self.rects.as_deref()
    }

    /// The message announcing this proxy to the host.
    pub fn added(&self, scope: &HostScope<'_>) -> Notification {
        Notification::NodeAdded {
            category: self.category,
            id: self.id,
            rects: self.get_rects(scope),
            visible: self.visible,
            fixed: self.fixed,
            password: self.password,
            text: self.text.clone(),
        }
    }

    /// Rects as the host should see them: clipped to the overflow ancestor
    /// while visible, otherwise as measured.
    pub fn get_rects(&self, scope: &HostScope<'_>) -> Vec<Rect> {
        let rects = self.rects.clone().unwrap_or_default();
        match self.overflow_ancestor {
            Some(ancestor) if self.visible => {
                let clip = scope.screen_bounds(ancestor, self.fixed);
                rects.iter().map(|rect| clip_rect(rect, &clip)).collect()
            }
            _ => rects,
        }
    }

    /// Re-measure; post `update/rects` and return true if the rects moved.
    pub fn update_rects(&mut self, scope: &mut HostScope<'_>) -> bool {
        let visible = self.check_visibility(&*scope.dom, scope.config);
        self.apply_visibility(visible, scope);

        let rects = scope.screen_rects(self.node, self.fixed);
        if compare_rect_lists(self.rects.as_deref(), Some(rects.as_slice())) {
            return false;
        }
        self.rects = Some(rects);
        let change = NodeChange::Rects(self.get_rects(scope));
        self.post(change, scope);
        true
    }

    pub fn set_fixed(&mut self, fixed: bool, scope: &mut HostScope<'_>) -> bool {
        if self.fixed == fixed {
            return false;
        }
        self.fixed = fixed;
        self.post(NodeChange::Fixed(fixed), scope);
        self.update_rects(scope);
        true
    }

    pub fn set_visibility(&mut self, visible: bool, scope: &mut HostScope<'_>) -> bool {
        if !self.apply_visibility(visible, scope) {
            return false;
        }
        if visible {
            self.update_rects(scope);
        }
        true
    }

    fn apply_visibility(&mut self, visible: bool, scope: &mut HostScope<'_>) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        self.post(NodeChange::Visible(visible), scope);
        true
    }

    /// Evaluate visibility from scratch, walking every ancestor's opacity.
    pub fn check_visibility(&self, dom: &dyn PageDom, config: &TrackerConfig) -> bool {
        if dom.computed_style(self.node).visibility == Visibility::Hidden {
            return false;
        }
        let bounds = dom.bounding_client_rect(self.node);
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return false;
        }
        let transparent = walk::self_and_ancestors(dom, self.node)
            .any(|node| dom.computed_style(node).opacity < config.opacity_epsilon);
        if transparent {
            return false;
        }
        match self.overflow_ancestor {
            Some(ancestor) => intersects(&bounds, &dom.bounding_client_rect(ancestor)),
            None => true,
        }
    }

    /// Cache the nearest ancestor with `overflow: hidden`. Containers are
    /// assumed not to nest, so the first match wins.
    pub fn search_overflow_ancestor(&mut self, dom: &dyn PageDom) -> Option<NodeKey> {
        self.overflow_ancestor = walk::ancestors(dom, self.node)
            .find(|ancestor| dom.computed_style(*ancestor).overflow == Overflow::Hidden);
        self.overflow_ancestor
    }

    pub fn clear_overflow_ancestor(&mut self) {
        self.overflow_ancestor = None;
    }

    /// Pick up text typed into the node by anything other than the tracker.
    pub fn refresh_text(&mut self, scope: &mut HostScope<'_>) -> bool {
        if self.category != Category::TextInput {
            return false;
        }
        let current = read_text(&*scope.dom, self.node);
        if current == self.text {
            return false;
        }
        self.text.clone_from(&current);
        self.post(NodeChange::Text(current), scope);
        true
    }

    /// Write `text` into the control, report it, and optionally submit the
    /// enclosing form.
    ///
    /// # Errors
    /// `NotTextInput` for links, `NoFormFound` when `submit` is set and no
    /// `<form>` encloses the node (the text is still written), `Dom` when the
    /// form refuses to submit.
    pub fn set_text_input(
        &mut self,
        text: &str,
        submit: bool,
        scope: &mut HostScope<'_>,
    ) -> Result<(), TrackError> {
        if self.category != Category::TextInput {
            return Err(TrackError::NotTextInput(self.id));
        }
        match scope.dom.tag_name(self.node).as_deref() {
            Some("textarea") => scope.dom.set_value(self.node, text),
            Some("input") => write_input_value(&mut *scope.dom, self.node, text),
            _ => scope.dom.set_text_content(self.node, text),
        }
        text.clone_into(&mut self.text);
        self.post(NodeChange::Text(text.to_owned()), scope);

        if !submit {
            return Ok(());
        }
        let Some(form) = find_form(&*scope.dom, self.node) else {
            return Err(TrackError::NoFormFound(self.id));
        };
        scope
            .dom
            .submit_form(form)
            .map_err(|err| TrackError::Dom(err.to_string()))
    }

    /// Remove the tracker tags from the node.
    pub fn untag(&self, dom: &mut dyn PageDom) {
        dom.remove_attribute(self.node, ID_ATTR);
        dom.remove_attribute(self.node, TYPE_ATTR);
    }

    fn post(&self, change: NodeChange, scope: &mut HostScope<'_>) {
        scope.emit(&Notification::NodeUpdated {
            category: self.category,
            id: self.id,
            change,
        });
    }
}

/// Current text of a control, or the text content of anything else.
fn read_text(dom: &dyn PageDom, node: NodeKey) -> String {
    match dom.tag_name(node).as_deref() {
        Some("input" | "textarea") => dom.value(node).unwrap_or_default(),
        _ => dom.text_content(node),
    }
}

/// Set an `<input>` value, mirroring it into a same-type sibling input that
/// stacks above the target. Pages sometimes overlay a decoy input on the real one.
fn write_input_value(dom: &mut dyn PageDom, node: NodeKey, text: &str) {
    dom.set_value(node, text);
    if let Some(top) = topmost_twin(&*dom, node)
        && top != node
    {
        dom.set_value(top, text);
    }
}

fn topmost_twin(dom: &dyn PageDom, node: NodeKey) -> Option<NodeKey> {
    let parent = dom.parent(node)?;
    let kind = input_type(dom, node);
    let z_index = |candidate: NodeKey| dom.computed_style(candidate).z_index.unwrap_or(0);

    let mut best = (node, z_index(node));
    for sibling in dom.element_children(parent) {
        if sibling == node
            || dom.tag_name(sibling).as_deref() != Some("input")
            || input_type(dom, sibling) != kind
        {
            continue;
        }
        let stacking = z_index(sibling);
        if stacking > best.1 {
            best = (sibling, stacking);
        }
    }
    Some(best.0)
}

fn find_form(dom: &dyn PageDom, node: NodeKey) -> Option<NodeKey> {
    walk::ancestors(dom, node).find(|ancestor| dom.tag_name(*ancestor).as_deref() == Some("form"))
}
