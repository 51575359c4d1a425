//! Geometry value types as the DOM reports them.

use serde::{Deserialize, Serialize};

/// An axis-aligned box given by its four edges, in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    #[inline]
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Build a rect from an origin and a size, the way layout boxes are usually given.
    #[inline]
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(top, left, top + height, left + width)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Move the rect by the given offsets.
    #[inline]
    #[must_use]
    pub fn translate(&self, delta_x: f64, delta_y: f64) -> Self {
        Self::new(
            self.top + delta_y,
            self.left + delta_x,
            self.bottom + delta_y,
            self.right + delta_x,
        )
    }

    /// Smallest rect covering both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.top.min(other.top),
            self.left.min(other.left),
            self.bottom.max(other.bottom),
            self.right.max(other.right),
        )
    }
}

/// Width and height of a box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scroll position of a container or of the page.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

impl ScrollOffset {
    #[inline]
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}
