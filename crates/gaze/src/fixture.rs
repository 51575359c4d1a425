//! JSON description of a page and the host events to replay against it.

use anyhow::{Context as _, Result, bail};
use dom::{ComputedStyle, MemoryDom, NodeKey, PageDom, Rect, Size};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<NodeFixture>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One element, or a text node when `tag` is absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeFixture {
    /// Handle the replay steps use to refer to this node.
    pub name: Option<String>,
    pub tag: Option<String>,
    pub text: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub style: ComputedStyle,
    /// Layout boxes as `[left, top, width, height]` in document coordinates.
    pub frames: Vec<[f64; 4]>,
    pub scroll_size: Option<Size>,
    pub client_size: Option<Size>,
    pub value: Option<String>,
    pub children: Vec<NodeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Refresh,
    Scroll {
        node: String,
        gaze_x: f64,
        gaze_y: f64,
    },
    PageScroll {
        x: f64,
        y: f64,
    },
    Zoom {
        factor: f64,
    },
    Text {
        node: String,
        text: String,
        #[serde(default)]
        submit: bool,
    },
    Insert {
        parent: String,
        fixture: NodeFixture,
    },
    Remove {
        node: String,
    },
}

impl PageFixture {
    /// Read and parse a fixture file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid fixture.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    /// # Errors
    /// Returns an error if `raw` is not a valid fixture.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build the initial page, recording every named node.
    ///
    /// # Errors
    /// Returns an error if a node name is used twice.
    pub fn build(&self, names: &mut HashMap<String, NodeKey>) -> Result<MemoryDom> {
        let mut dom = MemoryDom::new();
        dom.set_zoom(self.zoom);
        for node in &self.nodes {
            node.build(&mut dom, NodeKey::ROOT, names)?;
        }
        Ok(dom)
    }
}

impl NodeFixture {
    fn build(
        &self,
        dom: &mut MemoryDom,
        parent: NodeKey,
        names: &mut HashMap<String, NodeKey>,
    ) -> Result<NodeKey> {
        let key = match &self.tag {
            Some(tag) => dom.create_element(parent, tag)?,
            None => dom.create_text(parent, self.text.as_deref().unwrap_or_default())?,
        };
        self.register(key, names)?;
        if self.tag.is_some() {
            self.apply_layout(dom, key);
            for (name, value) in &self.attrs {
                dom.set_attribute(key, name, value);
            }
            if let Some(text) = &self.text {
                dom.create_text(key, text)?;
            }
        }
        for child in &self.children {
            child.build(dom, key, names)?;
        }
        Ok(key)
    }

    fn register(&self, key: NodeKey, names: &mut HashMap<String, NodeKey>) -> Result<()> {
        if let Some(name) = &self.name
            && names.insert(name.clone(), key).is_some()
        {
            bail!("node name '{name}' is used twice");
        }
        Ok(())
    }

    /// Everything about a node the mutation stream cannot carry.
    pub fn apply_layout(&self, dom: &mut MemoryDom, key: NodeKey) {
        dom.set_style(key, self.style);
        dom.set_layout(
            key,
            self.frames
                .iter()
                .map(|[left, top, width, height]| Rect::from_origin_size(*left, *top, *width, *height))
                .collect(),
        );
        if let Some(scroll_size) = self.scroll_size {
            let client_size = self.client_size.unwrap_or_else(|| dom.client_size(key));
            dom.set_scroll_extent(key, scroll_size, client_size);
        }
        if let Some(value) = &self.value {
            dom.set_value(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_nodes_and_text() {
        let fixture = PageFixture::parse(
            r#"{
                "nodes": [{
                    "name": "form", "tag": "form",
                    "children": [
                        { "name": "query", "tag": "input", "attrs": { "type": "search" },
                          "frames": [[10, 20, 200, 24]], "value": "cats" },
                        { "tag": "button", "text": "Go" }
                    ]
                }],
                "steps": [{ "op": "refresh" }, { "op": "zoom", "factor": 1.5 }]
            }"#,
        )
        .unwrap();
        let mut names = HashMap::new();
        let dom = fixture.build(&mut names).unwrap();

        let query = names["query"];
        assert_eq!(dom.parent(query), Some(names["form"]));
        assert_eq!(dom.attribute(query, "type").as_deref(), Some("search"));
        assert_eq!(dom.value(query).as_deref(), Some("cats"));
        assert_eq!(dom.client_rects(query), vec![Rect::new(20.0, 10.0, 44.0, 210.0)]);
        assert_eq!(dom.text_content(names["form"]), "Go");
        assert!(matches!(fixture.steps[1], Step::Zoom { factor } if factor == 1.5));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let fixture = PageFixture::parse(
            r#"{ "nodes": [{ "name": "x", "tag": "div" }, { "name": "x", "tag": "div" }] }"#,
        )
        .unwrap();
        assert!(fixture.build(&mut HashMap::new()).is_err());
    }
}
