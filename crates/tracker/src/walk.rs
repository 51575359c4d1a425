//! Tree traversal over a [`PageDom`].

use dom::{NodeKey, PageDom};

/// Recursively visit every element below `node`, parents before children.
pub fn visit_descendants(dom: &dyn PageDom, node: NodeKey, visitor: &mut dyn FnMut(NodeKey)) {
    for child in dom.element_children(node) {
        visitor(child);
        visit_descendants(dom, child, visitor);
    }
}

/// Every element below `node`, in document order.
pub fn descendants(dom: &dyn PageDom, node: NodeKey) -> Vec<NodeKey> {
    let mut out = Vec::new();
    visit_descendants(dom, node, &mut |child| out.push(child));
    out
}

/// `node` followed by all of its descendant elements.
pub fn subtree(dom: &dyn PageDom, node: NodeKey) -> Vec<NodeKey> {
    let mut out = vec![node];
    visit_descendants(dom, node, &mut |child| out.push(child));
    out
}

/// Walks parent links up to and including the document node.
pub struct Ancestors<'dom> {
    dom: &'dom dyn PageDom,
    next: Option<NodeKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        self.next = self.dom.parent(current);
        Some(current)
    }
}

/// Ancestors of `node`, nearest first, excluding `node` itself.
pub fn ancestors(dom: &dyn PageDom, node: NodeKey) -> Ancestors<'_> {
    Ancestors {
        dom,
        next: dom.parent(node),
    }
}

/// `node` and then its ancestors, nearest first.
pub fn self_and_ancestors(dom: &dyn PageDom, node: NodeKey) -> Ancestors<'_> {
    Ancestors {
        dom,
        next: Some(node),
    }
}
