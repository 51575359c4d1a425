//! Gaze scrolling of overflow containers and the clipping of what is inside.

use dom::{ComputedStyle, MemoryDom, NodeKey, Overflow, PageDom, Rect, ScrollOffset, Size};
use tracker::{Category, PageInstrumentation, RecordingSink, TrackerConfig};

type Page = PageInstrumentation<MemoryDom, RecordingSink>;

fn clipping() -> ComputedStyle {
    ComputedStyle {
        overflow: Overflow::Hidden,
        ..ComputedStyle::default()
    }
}

/// A 200x300 clipping container scrollable to 600x900, holding one link
/// at y = 100.
fn scroller() -> (Page, NodeKey, NodeKey) {
    let mut dom = MemoryDom::new();
    let container = dom.create_element(NodeKey::ROOT, "div").unwrap();
    dom.set_layout(container, vec![Rect::from_origin_size(0.0, 0.0, 200.0, 300.0)]);
    dom.set_style(container, clipping());
    dom.set_scroll_extent(container, Size::new(600.0, 900.0), Size::new(200.0, 300.0));
    let link = dom.create_element(container, "a").unwrap();
    dom.set_attribute(link, "href", "/item");
    dom.set_layout(link, vec![Rect::from_origin_size(0.0, 100.0, 50.0, 20.0)]);

    let mut page = PageInstrumentation::new(dom, RecordingSink::new(), TrackerConfig::default());
    page.scan_document();
    (page, container, link)
}

#[test]
fn scan_reports_container_before_its_content() {
    let (page, container, _) = scroller();
    assert_eq!(
        page.sink().lines(),
        [
            "#ovrflow#add#00#0;0;300;200#400;600#",
            "DOM#add#1#0#100.0;0.0;120.0;50.0#1#0#0##",
        ]
    );
    let link = page.tracked(Category::Link).get(0).unwrap();
    assert_eq!(link.overflow_ancestor(), Some(container));
}

#[test]
fn gaze_near_an_edge_scrolls_and_re_measures_content() {
    let (mut page, container, _) = scroller();
    page.sink_mut().clear();

    let position = page.scroll_overflow(0, 195.0, 150.0);
    assert_eq!(position, Some(ScrollOffset::new(7.5, 0.0)));
    assert_eq!(page.dom().scroll_position(container), ScrollOffset::new(7.5, 0.0));
    // Clipped to the container's left edge.
    assert_eq!(page.sink().lines(), ["DOM#upd#1#0#0#100.0;0.0;120.0;42.5#"]);
    assert_eq!(
        page.tracked_rects(Category::Link, 0),
        Some(vec![Rect::new(100.0, 0.0, 120.0, 42.5)])
    );
    page.sink_mut().clear();

    assert_eq!(
        page.scroll_overflow(0, 100.0, 150.0),
        Some(ScrollOffset::new(7.5, 0.0))
    );
    assert!(page.sink().lines().is_empty());

    assert_eq!(
        page.scroll_overflow(0, 5.0, 150.0),
        Some(ScrollOffset::new(0.0, 0.0))
    );
    assert_eq!(page.sink().lines(), ["DOM#upd#1#0#0#100.0;0.0;120.0;50.0#"]);
}

#[test]
fn unknown_containers_do_not_scroll() {
    let (mut page, _, _) = scroller();
    assert_eq!(page.scroll_overflow(4, 0.0, 0.0), None);
}

#[test]
fn zoom_rescales_everything_on_refresh() {
    let (mut page, _, _) = scroller();
    page.sink_mut().clear();

    page.dom_mut().set_zoom(Some(2.0));
    page.refresh_all();
    assert_eq!(
        page.sink().lines(),
        [
            "#ovrflow#upd#0#rect#0;0;600;400#",
            "DOM#upd#1#0#0#200.0;0.0;240.0;100.0#",
        ]
    );
    assert_eq!(
        page.overflow_rects(0),
        Some(vec![Rect::new(0.0, 0.0, 600.0, 400.0)])
    );
}

#[test]
fn content_scrolled_out_of_view_is_hidden() {
    let (mut page, container, _) = scroller();
    page.dom_mut()
        .set_scroll_position(container, ScrollOffset::new(0.0, 150.0));
    page.sink_mut().clear();

    page.refresh_all();
    assert_eq!(
        page.sink().lines(),
        ["DOM#upd#1#0#2#0#", "DOM#upd#1#0#0#-50.0;0.0;-30.0;50.0#"]
    );
    assert!(!page.tracked(Category::Link).get(0).unwrap().visible());
}

#[test]
fn containers_added_later_clip_existing_nodes() {
    let mut dom = MemoryDom::new();
    let panel = dom.create_element(NodeKey::ROOT, "section").unwrap();
    dom.set_layout(panel, vec![Rect::from_origin_size(0.0, 0.0, 100.0, 100.0)]);
    let link = dom.create_element(panel, "a").unwrap();
    dom.set_attribute(link, "href", "/wide");
    dom.set_layout(link, vec![Rect::from_origin_size(50.0, 10.0, 100.0, 10.0)]);
    let mut page = PageInstrumentation::new(dom, RecordingSink::new(), TrackerConfig::default());
    page.scan_document();
    assert_eq!(page.tracked(Category::Link).get(0).unwrap().overflow_ancestor(), None);

    page.dom_mut().set_style(panel, clipping());
    page.sink_mut().clear();
    assert_eq!(page.create_overflow_container(panel), Some(0));
    assert_eq!(page.create_overflow_container(panel), Some(0));
    assert_eq!(
        page.tracked(Category::Link).get(0).unwrap().overflow_ancestor(),
        Some(panel)
    );
    assert_eq!(
        page.tracked_rects(Category::Link, 0),
        Some(vec![Rect::new(10.0, 50.0, 20.0, 100.0)])
    );

    page.sink_mut().clear();
    assert!(page.remove_overflow_container(0));
    assert_eq!(page.sink().lines(), ["#ovrflow#rem#0"]);
    assert_eq!(page.tracked(Category::Link).get(0).unwrap().overflow_ancestor(), None);
    assert_eq!(
        page.tracked_rects(Category::Link, 0),
        Some(vec![Rect::new(10.0, 50.0, 20.0, 150.0)])
    );
}
