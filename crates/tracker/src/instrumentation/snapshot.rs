//! Serializable view of every live proxy, for hosts and tooling that want
//! the whole picture instead of the change stream.

use super::PageInstrumentation;
use crate::category::Category;
use crate::notify::NotificationSink;
use dom::{PageDom, Rect, ScrollOffset};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedSnapshot {
    pub category: Category,
    pub id: u32,
    pub node: u64,
    pub rects: Vec<Rect>,
    pub visible: bool,
    pub fixed: bool,
    pub password: bool,
    pub text: String,
    pub overflow_ancestor: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowSnapshot {
    pub id: u32,
    pub node: u64,
    pub rects: Vec<Rect>,
    pub fixed: bool,
    pub max_scroll: ScrollOffset,
    pub scroll: ScrollOffset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedSnapshot {
    pub id: u32,
    pub node: u64,
    pub rects: Vec<Rect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub tracked: Vec<TrackedSnapshot>,
    pub overflows: Vec<OverflowSnapshot>,
    pub fixed: Vec<FixedSnapshot>,
}

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    /// Capture every live proxy. Tracked rects are reported as the host sees
    /// them, clipped to their overflow ancestor.
    pub fn snapshot(&mut self) -> PageSnapshot {
        let scope = self.host.scope();
        let mut tracked = Vec::new();
        for (_, registry) in self.tracked.iter() {
            for (id, proxy) in registry.iter() {
                tracked.push(TrackedSnapshot {
                    category: proxy.category(),
                    id,
                    node: proxy.node().0,
                    rects: proxy.get_rects(&scope),
                    visible: proxy.visible(),
                    fixed: proxy.fixed(),
                    password: proxy.password(),
                    text: proxy.text().to_owned(),
                    overflow_ancestor: proxy.overflow_ancestor().map(|node| node.0),
                });
            }
        }
        let overflows = self
            .overflows
            .iter()
            .map(|(id, proxy)| OverflowSnapshot {
                id,
                node: proxy.node().0,
                rects: proxy.get_rects(),
                fixed: proxy.fixed(),
                max_scroll: proxy.max_scroll(),
                scroll: scope.dom.scroll_position(proxy.node()),
            })
            .collect();
        let fixed = self
            .fixed
            .iter()
            .map(|(id, proxy)| FixedSnapshot {
                id,
                node: proxy.node().0,
                rects: proxy.get_rects(),
            })
            .collect();
        PageSnapshot {
            tracked,
            overflows,
            fixed,
        }
    }
}
