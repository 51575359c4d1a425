//! DOM surface shared by the gaze tracker and its embedding host.
//!
//! The tracker never talks to a browser engine directly. It reads and tags
//! nodes through [`PageDom`], and follows structural changes through the
//! [`DOMUpdate`] stream. [`MemoryDom`] is a complete in-process page model
//! implementing both, used by the host replay tool and by tests.
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

use anyhow::Result;
use tokio::sync::broadcast;

pub mod memory;
pub mod page;
pub mod rect;
pub mod style;

pub use memory::{MemoryDom, MemoryNode, NodeKind};
pub use page::PageDom;
pub use rect::{Rect, ScrollOffset, Size};
pub use style::{ComputedStyle, Overflow, Position, Visibility};

/// A 64-bit stable key for DOM nodes, shared between the host and the tracker.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node key (always present).
    pub const ROOT: Self = Self(0);
}

/// A batchable structural change applied to the page and mirrored to subscribers.
#[derive(Debug, Clone)]
pub enum DOMUpdate {
    InsertElement { parent: NodeKey, node: NodeKey, tag: String, pos: usize },
    InsertText { parent: NodeKey, node: NodeKey, text: String, pos: usize },
    SetAttr { node: NodeKey, name: String, value: String },
    RemoveNode { node: NodeKey },
    EndOfDocument,
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    /// Returns an error if the update references nodes the subscriber cannot resolve.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()>;
}

/// Generic mirror that applies incoming DOM update batches to a subscriber.
pub struct DOMMirror<T: DOMSubscriber> {
    in_updater: broadcast::Receiver<Vec<DOMUpdate>>,
    mirror: T,
}

impl<T: DOMSubscriber> DOMMirror<T> {
    /// Create a new `DOMMirror` wrapping a subscriber implementation.
    pub fn new(in_updater: broadcast::Receiver<Vec<DOMUpdate>>, mirror: T) -> Self {
        Self { in_updater, mirror }
    }

    /// Drain and apply all pending `DOMUpdate` batches.
    ///
    /// # Errors
    /// Returns an error if the channel closed or the subscriber rejected an update.
    pub async fn update(&mut self) -> Result<()> {
        self.try_update_sync()
    }

    /// Synchronous variant for draining pending updates from the host's callback thread.
    ///
    /// # Errors
    /// Returns an error if the channel closed or the subscriber rejected an update.
    pub fn try_update_sync(&mut self) -> Result<()> {
        use tokio::sync::broadcast::error::TryRecvError;
        loop {
            match self.in_updater.try_recv() {
                Ok(batch) => {
                    for update in batch {
                        self.mirror.apply_update(update)?;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("DOM mirror lagged behind by {skipped} batches");
                }
                Err(TryRecvError::Closed) => {
                    return Err(anyhow::anyhow!(
                        "Recv channel was closed before document ended!"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Access the inner mirror mutably.
    pub fn mirror_mut(&mut self) -> &mut T {
        &mut self.mirror
    }

    /// Access the inner mirror immutably.
    pub fn mirror(&self) -> &T {
        &self.mirror
    }

    /// Consume the mirror and return the subscriber.
    pub fn into_inner(self) -> T {
        self.mirror
    }
}
