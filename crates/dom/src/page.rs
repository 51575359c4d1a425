//! The DOM API the tracker is written against.
//!
//! Every method mirrors a browser DOM call the content side would make
//! (`parentElement`, `getAttribute`, `getClientRects`, `scrollLeft`, ...).
//! The trait is object safe so the tracker can hand `&mut dyn PageDom`
//! down to its proxies.

use crate::{ComputedStyle, NodeKey, Rect, ScrollOffset, Size};
use anyhow::Result;

pub trait PageDom {
    /// The document node.
    fn root(&self) -> NodeKey;

    /// Parent of `node`, `None` for the document or unknown nodes.
    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    /// Children of `node` in document order, text nodes included.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Lowercase tag name, `None` for anything that is not an element.
    fn tag_name(&self, node: NodeKey) -> Option<String>;

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeKey, name: &str);

    fn computed_style(&self, node: NodeKey) -> ComputedStyle;

    /// Border boxes of the node's fragments, relative to the document and
    /// already shifted by the scroll offsets of any scrolled ancestor.
    fn client_rects(&self, node: NodeKey) -> Vec<Rect>;

    /// Smallest rect enclosing all client rects; all zero when the node has none.
    fn bounding_client_rect(&self, node: NodeKey) -> Rect;

    /// Current page zoom, `None` when the host has not reported one.
    fn zoom_factor(&self) -> Option<f64>;

    /// Current scroll offset of the page itself.
    fn page_scroll(&self) -> ScrollOffset;

    fn scroll_position(&self, node: NodeKey) -> ScrollOffset;

    /// Scroll `node` to `offset`; the DOM clamps to the scrollable range.
    fn set_scroll_position(&mut self, node: NodeKey, offset: ScrollOffset);

    /// Full size of the node's scrollable content.
    fn scroll_size(&self, node: NodeKey) -> Size;

    /// Visible size of the node's content box.
    fn client_size(&self, node: NodeKey) -> Size;

    /// Current value of a form control.
    fn value(&self, node: NodeKey) -> Option<String>;

    fn set_value(&mut self, node: NodeKey, value: &str);

    fn text_content(&self, node: NodeKey) -> String;

    fn set_text_content(&mut self, node: NodeKey, text: &str);

    /// Submit the given `<form>` element.
    ///
    /// # Errors
    /// Returns an error if `form` is not a form element.
    fn submit_form(&mut self, form: NodeKey) -> Result<()>;

    /// Whether `node` is still part of the page.
    fn contains(&self, node: NodeKey) -> bool;

    /// Whether `node` is an element (as opposed to text or the document).
    fn is_element(&self, node: NodeKey) -> bool {
        self.tag_name(node).is_some()
    }

    /// Element children only.
    fn element_children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.children(node)
            .into_iter()
            .filter(|child| self.is_element(*child))
            .collect()
    }
}
