//! Tracked node categories and the attribute tags that link DOM nodes to proxies.

use core::ops::{Index, IndexMut};
use serde::Serialize;

/// Tracker id of a text input or link, on the node itself.
pub const ID_ATTR: &str = "data-gaze-id";
/// Category type code of a text input or link, on the node itself.
pub const TYPE_ATTR: &str = "data-gaze-type";
/// Overflow container id, on the container node.
pub const OVERFLOW_ID_ATTR: &str = "data-gaze-overflow-id";
/// Fixed element id, on the fixed element node.
pub const FIXED_ELEMENT_ATTR: &str = "data-gaze-fixed-element";
/// Back-reference to the enclosing fixed element, on every descendant.
pub const FIXED_ID_ATTR: &str = "data-gaze-fixed-id";

/// Kinds of ordinary nodes mirrored by a [`crate::TrackedNode`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TextInput,
    Link,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::TextInput, Self::Link];

    /// Numeric type code used on the wire and in `data-gaze-type`.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::TextInput => 0,
            Self::Link => 1,
        }
    }

    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::TextInput),
            1 => Some(Self::Link),
            _ => None,
        }
    }

    /// Parse the value of a `data-gaze-type` attribute.
    pub fn from_attr(raw: &str) -> Option<Self> {
        raw.trim().parse::<u8>().ok().and_then(Self::from_code)
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TextInput => "text input",
            Self::Link => "link",
        }
    }
}

/// One value per [`Category`], indexed by the category itself.
#[derive(Debug, Default, Clone)]
pub struct CategoryTable<T> {
    text_inputs: T,
    links: T,
}

impl<T> CategoryTable<T> {
    pub const fn new(text_inputs: T, links: T) -> Self {
        Self { text_inputs, links }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        [
            (Category::TextInput, &self.text_inputs),
            (Category::Link, &self.links),
        ]
        .into_iter()
    }
}

impl<T> Index<Category> for CategoryTable<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        match category {
            Category::TextInput => &self.text_inputs,
            Category::Link => &self.links,
        }
    }
}

impl<T> IndexMut<Category> for CategoryTable<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::TextInput => &mut self.text_inputs,
            Category::Link => &mut self.links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_attribute_text() {
        for category in Category::ALL {
            let raw = category.code().to_string();
            assert_eq!(Category::from_attr(&raw), Some(category));
        }
        assert_eq!(Category::from_attr("7"), None);
        assert_eq!(Category::from_attr("link"), None);
    }

    #[test]
    fn table_is_indexed_by_category() {
        let mut table = CategoryTable::new(0_u32, 10_u32);
        table[Category::Link] += 1;
        assert_eq!(table[Category::TextInput], 0);
        assert_eq!(table[Category::Link], 11);
        let order: Vec<Category> = table.iter().map(|(category, _)| category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }
}
