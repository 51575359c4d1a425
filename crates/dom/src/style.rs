//! The subset of computed style the tracker reads.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// Resolved style values for one element, as `getComputedStyle` would report them.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub visibility: Visibility,
    pub opacity: f64,
    pub overflow: Overflow,
    pub position: Position,
    /// `None` stands for `z-index: auto`.
    pub z_index: Option<i32>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            visibility: Visibility::Visible,
            opacity: 1.0,
            overflow: Overflow::Visible,
            position: Position::Static,
            z_index: None,
        }
    }
}
