//! The tracker following the DOM mutation stream, both directly and behind
//! a `DOMMirror`.

use dom::{ComputedStyle, DOMMirror, DOMSubscriber, DOMUpdate, MemoryDom, NodeKey, PageDom, Position, Rect};
use tokio::sync::broadcast;
use tracker::category::FIXED_ID_ATTR;
use tracker::{Category, PageInstrumentation, RecordingSink, TrackerConfig};

type Page = PageInstrumentation<MemoryDom, RecordingSink>;

fn page() -> Page {
    PageInstrumentation::new(MemoryDom::new(), RecordingSink::new(), TrackerConfig::default())
}

fn insert(parent: NodeKey, node: u64, tag: &str) -> DOMUpdate {
    DOMUpdate::InsertElement {
        parent,
        node: NodeKey(node),
        tag: tag.to_owned(),
        pos: usize::MAX,
    }
}

fn set_attr(node: u64, name: &str, value: &str) -> DOMUpdate {
    DOMUpdate::SetAttr {
        node: NodeKey(node),
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

#[test]
fn links_are_tracked_once_they_gain_an_href() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 100, "a")).unwrap();
    assert!(page.tracked(Category::Link).is_empty());

    page.apply_update(set_attr(100, "href", "/next")).unwrap();
    assert_eq!(page.tracked(Category::Link).len(), 1);
    assert_eq!(page.sink().lines(), ["DOM#add#1#0##0#0#0##"]);
}

#[test]
fn inserted_text_reaches_editable_nodes() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 100, "div")).unwrap();
    page.apply_update(set_attr(100, "contenteditable", "true")).unwrap();
    page.apply_update(insert(NodeKey(100), 101, "p")).unwrap();
    page.sink_mut().clear();

    page.apply_update(DOMUpdate::InsertText {
        parent: NodeKey(101),
        node: NodeKey(102),
        text: String::from("draft"),
        pos: usize::MAX,
    })
    .unwrap();
    assert_eq!(page.sink().lines(), ["DOM#upd#0#0#3#draft#"]);
}

#[test]
fn removal_drops_proxies_before_the_nodes_go() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 100, "form")).unwrap();
    page.apply_update(insert(NodeKey(100), 101, "input")).unwrap();
    page.apply_update(insert(NodeKey(100), 102, "textarea")).unwrap();
    assert_eq!(page.tracked(Category::TextInput).len(), 2);
    page.sink_mut().clear();

    page.apply_update(DOMUpdate::RemoveNode { node: NodeKey(100) })
        .unwrap();
    assert_eq!(page.sink().lines(), ["DOM#rem#0#0#", "DOM#rem#0#1#"]);
    assert!(page.tracked(Category::TextInput).is_empty());
    assert!(!page.dom().contains(NodeKey(101)));
}

#[test]
fn refused_removal_keeps_every_proxy() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 100, "form")).unwrap();
    page.apply_update(insert(NodeKey(100), 101, "input")).unwrap();
    page.sink_mut().clear();

    assert!(page.apply_update(DOMUpdate::RemoveNode { node: NodeKey::ROOT }).is_err());
    assert!(page.apply_update(DOMUpdate::RemoveNode { node: NodeKey(555) }).is_err());

    assert_eq!(page.tracked(Category::TextInput).len(), 1);
    assert_eq!(page.dom().attribute(NodeKey(101), "data-gaze-id").as_deref(), Some("0"));
    assert!(page.sink().lines().is_empty());
}

#[test]
fn type_change_away_from_text_drops_the_proxy() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 101, "input")).unwrap();
    assert_eq!(page.sink().lines(), ["DOM#add#0#0##0#0#0##"]);
    page.sink_mut().clear();

    page.apply_update(set_attr(101, "type", "checkbox")).unwrap();
    assert_eq!(page.sink().lines(), ["DOM#rem#0#0#"]);
    assert!(page.tracked(Category::TextInput).is_empty());
    assert_eq!(page.dom().attribute(NodeKey(101), "data-gaze-id"), None);
}

#[test]
fn type_change_to_password_reannounces_the_input() {
    let mut page = page();
    page.apply_update(insert(NodeKey::ROOT, 101, "input")).unwrap();
    page.sink_mut().clear();

    page.apply_update(set_attr(101, "type", "password")).unwrap();
    assert_eq!(page.sink().lines(), ["DOM#rem#0#0#", "DOM#add#0#1##0#0#1##"]);
    assert!(page.tracked(Category::TextInput).get(1).unwrap().password());

    // Same category and flag: nothing to redo.
    page.sink_mut().clear();
    page.apply_update(set_attr(101, "type", "PASSWORD")).unwrap();
    assert!(page.sink().lines().is_empty());
}

#[test]
fn nodes_inserted_into_a_fixed_element_inherit_its_state() {
    let mut dom = MemoryDom::new();
    let bar = dom.create_element(NodeKey::ROOT, "header").unwrap();
    dom.set_layout(bar, vec![Rect::from_origin_size(0.0, 0.0, 300.0, 40.0)]);
    dom.set_style(
        bar,
        ComputedStyle {
            position: Position::Fixed,
            ..ComputedStyle::default()
        },
    );
    let mut page = PageInstrumentation::new(dom, RecordingSink::new(), TrackerConfig::default());
    page.scan_document();

    page.apply_update(insert(bar, 100, "a")).unwrap();
    page.apply_update(set_attr(100, "href", "/home")).unwrap();
    assert_eq!(page.dom().attribute(NodeKey(100), FIXED_ID_ATTR).as_deref(), Some("0"));
    assert!(page.tracked(Category::Link).get(0).unwrap().fixed());

    page.sink_mut().clear();
    page.apply_update(DOMUpdate::RemoveNode { node: NodeKey(100) })
        .unwrap();
    assert_eq!(page.sink().lines(), ["DOM#rem#1#0#"]);
}

#[tokio::test]
async fn tracker_follows_a_dom_mirror() {
    let (in_tx, in_rx) = broadcast::channel::<Vec<DOMUpdate>>(8);
    let mut mirror = DOMMirror::new(in_rx, page());

    in_tx
        .send(vec![
            insert(NodeKey::ROOT, 100, "form"),
            insert(NodeKey(100), 101, "input"),
            set_attr(101, "type", "email"),
            DOMUpdate::EndOfDocument,
        ])
        .unwrap();
    mirror.update().await.unwrap();

    let page = mirror.into_inner();
    let input = page.tracked(Category::TextInput).get(0).unwrap();
    assert_eq!(input.node(), NodeKey(101));
    assert_eq!(
        page.dom().attribute(NodeKey(101), "data-gaze-id").as_deref(),
        Some("0")
    );
}
