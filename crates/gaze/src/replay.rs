//! Drives a `PageInstrumentation` through a fixture's steps the way an
//! embedding host would: structural changes arrive as `DOMUpdate` batches,
//! everything else as direct calls.

use crate::fixture::{NodeFixture, PageFixture, Step};
use anyhow::{Result, anyhow};
use dom::{DOMMirror, DOMUpdate, MemoryDom, NodeKey, ScrollOffset};
use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tracker::{ChannelSink, PageInstrumentation, PageSnapshot, TrackerConfig};

type Page = PageInstrumentation<MemoryDom, ChannelSink>;

pub struct Replay {
    mirror: DOMMirror<Page>,
    updates: broadcast::Sender<Vec<DOMUpdate>>,
    lines: mpsc::UnboundedReceiver<String>,
    received: Vec<String>,
    names: HashMap<String, NodeKey>,
    steps: Vec<Step>,
}

impl Replay {
    /// Build the page, scan it and collect the initial protocol lines.
    ///
    /// # Errors
    /// Returns an error if the fixture's node tree is inconsistent.
    pub fn new(fixture: PageFixture, config: TrackerConfig) -> Result<Self> {
        let mut names = HashMap::new();
        let dom = fixture.build(&mut names)?;

        let (line_tx, lines) = mpsc::unbounded_channel();
        let mut page = PageInstrumentation::new(dom, ChannelSink::new(line_tx), config);
        page.scan_document();

        let (updates, updates_rx) = broadcast::channel(64);
        let mut replay = Self {
            mirror: DOMMirror::new(updates_rx, page),
            updates,
            lines,
            received: Vec::new(),
            names,
            steps: fixture.steps,
        };
        replay.collect_lines();
        Ok(replay)
    }

    /// Run every step in order.
    ///
    /// # Errors
    /// Returns an error if a step names an unknown node or the DOM rejects an update.
    pub async fn run(&mut self) -> Result<()> {
        let steps = core::mem::take(&mut self.steps);
        for (index, step) in steps.into_iter().enumerate() {
            debug!("step {index}: {step:?}");
            self.apply(step).await?;
            self.collect_lines();
        }
        Ok(())
    }

    async fn apply(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Refresh => self.page_mut().refresh_all(),
            Step::Scroll {
                node,
                gaze_x,
                gaze_y,
            } => {
                let key = self.lookup(&node)?;
                let container = self
                    .page()
                    .overflows()
                    .iter()
                    .find(|(_, proxy)| proxy.node() == key)
                    .map(|(id, _)| id);
                let Some(id) = container else {
                    warn!("'{node}' is not an overflow container, skipping scroll");
                    return Ok(());
                };
                if let Some(position) = self.page_mut().scroll_overflow(id, gaze_x, gaze_y) {
                    info!("'{node}' scrolled to ({}, {})", position.left, position.top);
                }
            }
            Step::PageScroll { x, y } => {
                self.page_mut().dom_mut().set_page_scroll(ScrollOffset::new(x, y));
                self.page_mut().refresh_all();
            }
            Step::Zoom { factor } => {
                self.page_mut().dom_mut().set_zoom(Some(factor));
                self.page_mut().refresh_all();
            }
            Step::Text { node, text, submit } => {
                let key = self.lookup(&node)?;
                let page = self.page_mut();
                match page.resolve_node(key) {
                    Ok((_, id)) => {
                        page.set_text_input(id, &text, submit);
                    }
                    Err(err) => warn!("cannot type into '{node}': {err}"),
                }
            }
            Step::Insert { parent, fixture } => {
                let parent = self.lookup(&parent)?;
                let mut batch = Vec::new();
                let mut placed = Vec::new();
                self.plan_insert(parent, &fixture, &mut batch, &mut placed)?;
                let root = placed.first().map(|(key, _)| *key);
                self.send(batch).await?;
                for (key, node) in &placed {
                    node.apply_layout(self.page_mut().dom_mut(), *key);
                }
                // Styles and layout arrive after the nodes; classify again with them in place.
                if let Some(root) = root {
                    self.page_mut().classify_subtree(root);
                    self.page_mut().refresh_all();
                }
            }
            Step::Remove { node } => {
                let key = self.lookup(&node)?;
                self.send(vec![DOMUpdate::RemoveNode { node: key }]).await?;
                self.names.retain(|_, value| *value != key);
            }
        }
        Ok(())
    }

    /// Turn a fixture subtree into insert updates under freshly minted keys.
    fn plan_insert(
        &mut self,
        parent: NodeKey,
        fixture: &NodeFixture,
        batch: &mut Vec<DOMUpdate>,
        placed: &mut Vec<(NodeKey, NodeFixture)>,
    ) -> Result<()> {
        let key = self.page_mut().dom_mut().mint_key()?;
        if let Some(name) = &fixture.name {
            self.names.insert(name.clone(), key);
        }
        let Some(tag) = &fixture.tag else {
            batch.push(DOMUpdate::InsertText {
                parent,
                node: key,
                text: fixture.text.clone().unwrap_or_default(),
                pos: usize::MAX,
            });
            return Ok(());
        };
        batch.push(DOMUpdate::InsertElement {
            parent,
            node: key,
            tag: tag.clone(),
            pos: usize::MAX,
        });
        for (name, value) in &fixture.attrs {
            batch.push(DOMUpdate::SetAttr {
                node: key,
                name: name.clone(),
                value: value.clone(),
            });
        }
        if let Some(text) = &fixture.text {
            batch.push(DOMUpdate::InsertText {
                parent: key,
                node: self.page_mut().dom_mut().mint_key()?,
                text: text.clone(),
                pos: usize::MAX,
            });
        }
        placed.push((key, fixture.clone()));
        for child in &fixture.children {
            self.plan_insert(key, child, batch, placed)?;
        }
        Ok(())
    }

    async fn send(&mut self, batch: Vec<DOMUpdate>) -> Result<()> {
        self.updates
            .send(batch)
            .map_err(|_| anyhow!("no mirror is listening for DOM updates"))?;
        self.mirror.update().await
    }

    fn lookup(&self, name: &str) -> Result<NodeKey> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("fixture has no node named '{name}'"))
    }

    fn collect_lines(&mut self) {
        while let Ok(line) = self.lines.try_recv() {
            info!(target: "gaze::host", "{line}");
            self.received.push(line);
        }
    }

    pub fn page(&self) -> &Page {
        self.mirror.mirror()
    }

    pub fn page_mut(&mut self) -> &mut Page {
        self.mirror.mirror_mut()
    }

    /// Every protocol line the host has received so far.
    pub fn received(&self) -> &[String] {
        &self.received
    }

    pub fn snapshot(&mut self) -> PageSnapshot {
        self.page_mut().snapshot()
    }
}
