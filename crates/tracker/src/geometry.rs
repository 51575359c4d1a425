//! Rectangle helpers used for change detection, clipping and fixed-element covers.

use dom::{Rect, ScrollOffset};

/// Scale all four edges of `rect` by the page zoom.
#[inline]
pub fn adjust_rect_to_zoom(rect: &Rect, zoom: f64) -> Rect {
    Rect::new(
        rect.top * zoom,
        rect.left * zoom,
        rect.bottom * zoom,
        rect.right * zoom,
    )
}

/// Whether `rect` can be ignored next to `container`.
///
/// Degenerate rects (zero width or height) always count as contained.
/// Partially overlapping rects are not contained; they are never split.
#[inline]
pub fn is_rect_contained(rect: &Rect, container: &Rect) -> bool {
    if rect.width() == 0.0 || rect.height() == 0.0 {
        return true;
    }
    rect.top >= container.top
        && rect.left >= container.left
        && rect.bottom <= container.bottom
        && rect.right <= container.right
}

/// Structural equality of two rect lists. A missing list never equals anything.
pub fn compare_rect_lists(first: Option<&[Rect]>, second: Option<&[Rect]>) -> bool {
    let (Some(first), Some(second)) = (first, second) else {
        return false;
    };
    first.len() == second.len() && first.iter().zip(second).all(|(lhs, rhs)| lhs == rhs)
}

/// Translate `rect` into viewport coordinates by removing the page scroll.
#[inline]
pub fn subtract_scroll_offset(rect: &Rect, scroll: ScrollOffset) -> Rect {
    rect.translate(-scroll.left, -scroll.top)
}

/// Whether the two rects overlap with non-zero area.
#[inline]
pub fn intersects(first: &Rect, second: &Rect) -> bool {
    first.left < second.right
        && first.right > second.left
        && first.top < second.bottom
        && first.bottom > second.top
}

/// Clip `rect` to `clip` edge by edge.
#[inline]
pub fn clip_rect(rect: &Rect, clip: &Rect) -> Rect {
    Rect::new(
        rect.top.max(clip.top),
        rect.left.max(clip.left),
        rect.bottom.min(clip.bottom),
        rect.right.min(clip.right),
    )
}

/// Add `candidate` to an approximate cover unless a rect already in it contains it.
///
/// Returns whether the candidate was appended.
pub fn merge_into_cover(cover: &mut Vec<Rect>, candidate: Rect) -> bool {
    if cover
        .iter()
        .any(|existing| is_rect_contained(&candidate, existing))
    {
        return false;
    }
    cover.push(candidate);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn degenerate_rects_are_always_contained() {
        let flat = Rect::new(500.0, 500.0, 500.0, 900.0);
        let thin = Rect::new(-50.0, 300.0, 80.0, 300.0);
        assert!(is_rect_contained(&flat, &CONTAINER));
        assert!(is_rect_contained(&thin, &CONTAINER));
        assert!(is_rect_contained(&flat, &Rect::default()));
    }

    #[test]
    fn containment_is_edge_sensitive() {
        let inner = Rect::new(10.0, 10.0, 90.0, 90.0);
        assert!(is_rect_contained(&inner, &CONTAINER));
        assert!(is_rect_contained(&CONTAINER, &CONTAINER));

        let moved = [
            Rect::new(-1.0, 10.0, 90.0, 90.0),
            Rect::new(10.0, -1.0, 90.0, 90.0),
            Rect::new(10.0, 10.0, 101.0, 90.0),
            Rect::new(10.0, 10.0, 90.0, 101.0),
        ];
        for rect in moved {
            assert!(!is_rect_contained(&rect, &CONTAINER), "{rect:?}");
        }
    }

    #[test]
    fn rect_lists_compare_structurally() {
        let list = vec![CONTAINER, Rect::new(1.0, 2.0, 3.0, 4.0)];
        assert!(compare_rect_lists(Some(&list[..]), Some(&list[..])));

        let mut nudged = list.clone();
        nudged[1].right = 4.5;
        assert!(!compare_rect_lists(Some(&list[..]), Some(&nudged[..])));
        assert!(!compare_rect_lists(Some(&list[..]), Some(&list[..1])));
        assert!(!compare_rect_lists(Some(&list[..]), None));
        assert!(!compare_rect_lists(None, None));
    }

    #[test]
    fn zoom_scales_every_edge() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(
            adjust_rect_to_zoom(&rect, 1.5),
            Rect::new(15.0, 30.0, 45.0, 60.0)
        );
        assert_eq!(adjust_rect_to_zoom(&rect, 1.0), rect);
    }

    #[test]
    fn scroll_offset_moves_into_viewport() {
        let rect = Rect::new(510.0, 20.0, 530.0, 40.0);
        assert_eq!(
            subtract_scroll_offset(&rect, ScrollOffset::new(5.0, 500.0)),
            Rect::new(10.0, 15.0, 30.0, 35.0)
        );
    }

    #[test]
    fn clipping_and_intersection() {
        let rect = Rect::new(-20.0, 50.0, 40.0, 150.0);
        assert!(intersects(&rect, &CONTAINER));
        assert_eq!(clip_rect(&rect, &CONTAINER), Rect::new(0.0, 50.0, 40.0, 100.0));

        let touching = Rect::new(100.0, 0.0, 120.0, 100.0);
        assert!(!intersects(&touching, &CONTAINER));
    }

    #[test]
    fn cover_skips_contained_candidates() {
        let mut cover = vec![CONTAINER];
        assert!(!merge_into_cover(&mut cover, Rect::new(5.0, 5.0, 50.0, 50.0)));
        assert!(merge_into_cover(&mut cover, Rect::new(50.0, 50.0, 150.0, 150.0)));
        // Overlapping but not contained: appended as-is, no union.
        assert_eq!(cover.len(), 2);
        assert_eq!(cover[1], Rect::new(50.0, 50.0, 150.0, 150.0));
    }
}
