//! The page-level context that owns every proxy registry.
//!
//! `PageInstrumentation` is the single entry point for the host: node
//! creation and removal, gaze scroll requests, text entry and the per-frame
//! refresh all go through `&mut self`, so calls are applied strictly in the
//! order the host makes them.

mod input;
mod lifecycle;
mod refresh;
mod snapshot;
mod subscriber;

pub use snapshot::{FixedSnapshot, OverflowSnapshot, PageSnapshot, TrackedSnapshot};

use crate::category::{
    Category, CategoryTable, FIXED_ELEMENT_ATTR, ID_ATTR, OVERFLOW_ID_ATTR, TYPE_ATTR,
};
use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::notify::NotificationSink;
use crate::proxies::{FixedElement, HostScope, OverflowContainer, TrackedNode};
use crate::registry::Registry;
use dom::{NodeKey, PageDom};

/// The DOM, the outbound channel and the tuning the proxies run against.
struct Host<D, S> {
    dom: D,
    sink: S,
    config: TrackerConfig,
}

impl<D: PageDom, S: NotificationSink> Host<D, S> {
    fn scope(&mut self) -> HostScope<'_> {
        HostScope::new(&mut self.dom, &mut self.sink, &self.config)
    }
}

pub struct PageInstrumentation<D, S> {
    host: Host<D, S>,
    tracked: CategoryTable<Registry<TrackedNode>>,
    overflows: Registry<OverflowContainer>,
    fixed: Registry<FixedElement>,
}

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    pub fn new(dom: D, sink: S, config: TrackerConfig) -> Self {
        Self {
            host: Host { dom, sink, config },
            tracked: CategoryTable::default(),
            overflows: Registry::new(),
            fixed: Registry::new(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.host.dom
    }

    /// Mutable DOM access for the host. Changes made here are only picked up
    /// by the next refresh.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.host.dom
    }

    pub fn sink(&self) -> &S {
        &self.host.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.host.sink
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.host.config
    }

    pub fn tracked(&self, category: Category) -> &Registry<TrackedNode> {
        &self.tracked[category]
    }

    pub fn overflows(&self) -> &Registry<OverflowContainer> {
        &self.overflows
    }

    pub fn fixed_elements(&self) -> &Registry<FixedElement> {
        &self.fixed
    }

    /// Resolve a tracked node from its attribute tags.
    ///
    /// # Errors
    /// Reports which tag is missing or malformed, or that no live proxy
    /// matches it.
    pub fn resolve_node(&self, node: NodeKey) -> Result<(Category, u32), TrackError> {
        let dom = &self.host.dom;
        let raw_type = dom
            .attribute(node, TYPE_ATTR)
            .ok_or(TrackError::MissingCategory(node))?;
        let category = Category::from_attr(&raw_type).ok_or(TrackError::UnknownCategory(raw_type))?;
        let raw_id = dom.attribute(node, ID_ATTR).ok_or(TrackError::MissingId(node))?;
        let id = parse_id(&raw_id)?;
        match self.tracked[category].get(id) {
            Some(proxy) if proxy.node() == node => Ok((category, id)),
            _ => Err(TrackError::UnknownId {
                registry: category.label(),
                id,
            }),
        }
    }

    /// Tracked proxy for `node`, if it is tagged with a live one.
    fn tracked_at(&self, node: NodeKey) -> Option<(Category, u32)> {
        if self.host.dom.attribute(node, ID_ATTR).is_none() {
            return None;
        }
        self.resolve_node(node).ok()
    }

    fn overflow_at(&self, node: NodeKey) -> Option<u32> {
        let id = parse_id(&self.host.dom.attribute(node, OVERFLOW_ID_ATTR)?).ok()?;
        self.overflows
            .get(id)
            .filter(|proxy| proxy.node() == node)
            .map(|_| id)
    }

    fn fixed_at(&self, node: NodeKey) -> Option<u32> {
        let id = parse_id(&self.host.dom.attribute(node, FIXED_ELEMENT_ATTR)?).ok()?;
        self.fixed
            .get(id)
            .filter(|proxy| proxy.node() == node)
            .map(|_| id)
    }
}

fn parse_id(raw: &str) -> Result<u32, TrackError> {
    raw.trim()
        .parse()
        .map_err(|_| TrackError::InvalidId(raw.to_owned()))
}
