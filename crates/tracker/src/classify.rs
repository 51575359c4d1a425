//! Decides which tracked kinds an element belongs to.
//!
//! The kinds are independent: a link can sit inside, or itself be, a fixed
//! element, and an overflow container can be fixed as well.

use crate::category::{Category, FIXED_ID_ATTR};
use crate::walk;
use dom::{NodeKey, Overflow, PageDom, Position};

/// `<input>` types that accept free text.
const TEXT_INPUT_TYPES: [&str; 7] = ["text", "search", "email", "url", "password", "tel", ""];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub category: Option<Category>,
    pub overflow: bool,
    pub fixed: bool,
}

pub fn classify(dom: &dyn PageDom, node: NodeKey) -> Classification {
    let Some(tag) = dom.tag_name(node) else {
        return Classification::default();
    };
    let style = dom.computed_style(node);
    Classification {
        category: category_of(dom, node, &tag),
        overflow: style.overflow == Overflow::Hidden,
        fixed: style.position == Position::Fixed,
    }
}

fn category_of(dom: &dyn PageDom, node: NodeKey, tag: &str) -> Option<Category> {
    match tag {
        "textarea" => Some(Category::TextInput),
        "input" => TEXT_INPUT_TYPES
            .contains(&input_type(dom, node).as_str())
            .then_some(Category::TextInput),
        "a" if dom.attribute(node, "href").is_some() => Some(Category::Link),
        _ if is_content_editable(dom, node) => Some(Category::TextInput),
        _ => None,
    }
}

/// Lowercased `type` attribute of an `<input>`, empty when absent.
pub fn input_type(dom: &dyn PageDom, node: NodeKey) -> String {
    dom.attribute(node, "type")
        .map(|raw| raw.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_password(dom: &dyn PageDom, node: NodeKey) -> bool {
    dom.tag_name(node).as_deref() == Some("input") && input_type(dom, node) == "password"
}

fn is_content_editable(dom: &dyn PageDom, node: NodeKey) -> bool {
    dom.attribute(node, "contenteditable")
        .is_some_and(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "true"))
}

/// Whether `node` renders outside the page scroll flow, either because it or
/// an ancestor is `position: fixed`, or because a fixed element tagged it.
pub fn is_inside_fixed(dom: &dyn PageDom, node: NodeKey) -> bool {
    dom.attribute(node, FIXED_ID_ATTR).is_some()
        || walk::self_and_ancestors(dom, node)
            .any(|current| dom.computed_style(current).position == Position::Fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{ComputedStyle, MemoryDom};

    fn element(dom: &mut MemoryDom, parent: NodeKey, tag: &str, attrs: &[(&str, &str)]) -> NodeKey {
        let node = dom.create_element(parent, tag).unwrap();
        for (name, value) in attrs {
            dom.set_attribute(node, name, value);
        }
        node
    }

    #[test]
    fn text_inputs_and_links() {
        let mut dom = MemoryDom::new();
        let plain = element(&mut dom, NodeKey::ROOT, "input", &[]);
        let search = element(&mut dom, NodeKey::ROOT, "input", &[("type", "Search")]);
        let checkbox = element(&mut dom, NodeKey::ROOT, "input", &[("type", "checkbox")]);
        let area = element(&mut dom, NodeKey::ROOT, "textarea", &[]);
        let editable = element(&mut dom, NodeKey::ROOT, "div", &[("contenteditable", "true")]);
        let link = element(&mut dom, NodeKey::ROOT, "a", &[("href", "/next")]);
        let anchor = element(&mut dom, NodeKey::ROOT, "a", &[("name", "top")]);

        let category = |node| classify(&dom, node).category;
        assert_eq!(category(plain), Some(Category::TextInput));
        assert_eq!(category(search), Some(Category::TextInput));
        assert_eq!(category(checkbox), None);
        assert_eq!(category(area), Some(Category::TextInput));
        assert_eq!(category(editable), Some(Category::TextInput));
        assert_eq!(category(link), Some(Category::Link));
        assert_eq!(category(anchor), None);
    }

    #[test]
    fn password_flag_only_for_password_inputs() {
        let mut dom = MemoryDom::new();
        let secret = element(&mut dom, NodeKey::ROOT, "input", &[("type", "password")]);
        let plain = element(&mut dom, NodeKey::ROOT, "input", &[]);
        assert!(is_password(&dom, secret));
        assert!(!is_password(&dom, plain));
    }

    #[test]
    fn fixed_status_is_inherited_from_ancestors() {
        let mut dom = MemoryDom::new();
        let bar = element(&mut dom, NodeKey::ROOT, "nav", &[]);
        let link = element(&mut dom, bar, "a", &[("href", "/")]);
        assert!(!is_inside_fixed(&dom, link));

        dom.set_style(
            bar,
            ComputedStyle {
                position: Position::Fixed,
                ..ComputedStyle::default()
            },
        );
        assert!(classify(&dom, bar).fixed);
        assert!(is_inside_fixed(&dom, link));
    }

    #[test]
    fn text_nodes_are_never_classified() {
        let mut dom = MemoryDom::new();
        let text = dom.create_text(NodeKey::ROOT, "hello").unwrap();
        assert_eq!(classify(&dom, text), Classification::default());
    }
}
