//! Host protocol messages and the channels that carry them.
//!
//! Every message is a single `#`-delimited line. Field order and count are
//! fixed per message kind and there is no versioning. Free text is written
//! verbatim, so a `#` inside a text value will confuse the host parser.
//!
//! Tracked node messages print coordinates with one decimal (`12.5;4.0`),
//! overflow and fixed element messages print them the shortest way (`10;20.5`).

use crate::category::Category;
use dom::{Rect, ScrollOffset};
use log::{debug, info, warn};
use std::fmt::{Display, Formatter, Result as FmtResult, Write as _};
use tokio::sync::mpsc::UnboundedSender;

/// Attribute changes reported for a tracked node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeChange {
    Rects(Vec<Rect>),
    Fixed(bool),
    Visible(bool),
    Text(String),
}

impl NodeChange {
    /// Attribute code on the wire.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Rects(_) => 0,
            Self::Fixed(_) => 1,
            Self::Visible(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

/// Attribute changes reported for an overflow container.
#[derive(Clone, Debug, PartialEq)]
pub enum OverflowChange {
    Rects(Vec<Rect>),
    Fixed(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    NodeAdded {
        category: Category,
        id: u32,
        rects: Vec<Rect>,
        visible: bool,
        fixed: bool,
        password: bool,
        text: String,
    },
    NodeUpdated {
        category: Category,
        id: u32,
        change: NodeChange,
    },
    NodeRemoved {
        category: Category,
        id: u32,
    },
    OverflowAdded {
        id: u32,
        fixed: bool,
        rect: Rect,
        max_scroll: ScrollOffset,
    },
    OverflowUpdated {
        id: u32,
        change: OverflowChange,
    },
    OverflowRemoved {
        id: u32,
    },
    /// Sent on creation and whenever the cover changes.
    FixedAdded {
        id: u32,
        rects: Vec<Rect>,
    },
    FixedRemoved {
        id: u32,
    },
}

const fn flag(value: bool) -> char {
    if value { '1' } else { '0' }
}

/// Rect list with one decimal per coordinate.
struct Decimal<'rects>(&'rects [Rect]);

impl Display for Decimal<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for rect in self.0 {
            for value in [rect.top, rect.left, rect.bottom, rect.right] {
                if !first {
                    f.write_char(';')?;
                }
                first = false;
                write!(f, "{value:.1}")?;
            }
        }
        Ok(())
    }
}

/// Rect list with the shortest number formatting.
struct Shortest<'rects>(&'rects [Rect]);

impl Display for Shortest<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for rect in self.0 {
            for value in [rect.top, rect.left, rect.bottom, rect.right] {
                if !first {
                    f.write_char(';')?;
                }
                first = false;
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NodeAdded {
                category,
                id,
                rects,
                visible,
                fixed,
                password,
                text,
            } => write!(
                f,
                "DOM#add#{}#{id}#{}#{}#{}#{}#{text}#",
                category.code(),
                Decimal(rects.as_slice()),
                flag(*visible),
                flag(*fixed),
                flag(*password),
            ),
            Self::NodeUpdated {
                category,
                id,
                change,
            } => {
                write!(f, "DOM#upd#{}#{id}#{}#", category.code(), change.code())?;
                match change {
                    NodeChange::Rects(rects) => write!(f, "{}#", Decimal(rects.as_slice())),
                    NodeChange::Fixed(value) | NodeChange::Visible(value) => {
                        write!(f, "{}#", flag(*value))
                    }
                    NodeChange::Text(text) => write!(f, "{text}#"),
                }
            }
            Self::NodeRemoved { category, id } => write!(f, "DOM#rem#{}#{id}#", category.code()),
            Self::OverflowAdded {
                id,
                fixed,
                rect,
                max_scroll,
            } => write!(
                f,
                "#ovrflow#add#{}{id}#{}#{};{}#",
                flag(*fixed),
                Shortest(core::slice::from_ref(rect)),
                max_scroll.left,
                max_scroll.top,
            ),
            Self::OverflowUpdated { id, change } => match change {
                OverflowChange::Rects(rects) => {
                    write!(f, "#ovrflow#upd#{id}#rect#{}#", Shortest(rects.as_slice()))
                }
                OverflowChange::Fixed(value) => {
                    write!(f, "#ovrflow#upd#{id}#fixed#{}#", flag(*value))
                }
            },
            Self::OverflowRemoved { id } => write!(f, "#ovrflow#rem#{id}"),
            Self::FixedAdded { id, rects } => write!(f, "#fixElem#add#{id}#{}#", Shortest(rects.as_slice())),
            Self::FixedRemoved { id } => write!(f, "#fixElem#rem#{id}"),
        }
    }
}

/// One-way channel to the embedding host. Delivery is not acknowledged.
pub trait NotificationSink {
    fn post(&mut self, line: &str);
}

/// Encode `notification` and hand it to `sink`.
pub fn emit(sink: &mut dyn NotificationSink, notification: &Notification) {
    let line = notification.to_string();
    debug!("notify: {line}");
    sink.post(&line);
}

/// Writes protocol lines to the console log, where the embedding host
/// intercepts them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn post(&mut self, line: &str) {
        info!(target: "gaze::console", "{line}");
    }
}

/// Keeps every posted line in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    lines: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl NotificationSink for RecordingSink {
    fn post(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

/// Forwards protocol lines over an unbounded channel to a host-side task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<String>,
}

impl ChannelSink {
    pub const fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

impl NotificationSink for ChannelSink {
    fn post(&mut self, line: &str) {
        if self.sender.send(line.to_owned()).is_err() {
            warn!("host channel closed, dropping: {line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_node_updates() {
        let rects = Notification::NodeUpdated {
            category: Category::TextInput,
            id: 3,
            change: NodeChange::Rects(vec![Rect::new(12.5, 4.0, 40.0, 200.0)]),
        };
        assert_eq!(rects.to_string(), "DOM#upd#0#3#0#12.5;4.0;40.0;200.0#");

        let fixed = Notification::NodeUpdated {
            category: Category::Link,
            id: 7,
            change: NodeChange::Fixed(true),
        };
        assert_eq!(fixed.to_string(), "DOM#upd#1#7#1#1#");

        let text = Notification::NodeUpdated {
            category: Category::TextInput,
            id: 0,
            change: NodeChange::Text(String::from("a;b")),
        };
        assert_eq!(text.to_string(), "DOM#upd#0#0#3#a;b#");
    }

    #[test]
    fn several_rects_join_into_one_field() {
        let added = Notification::NodeAdded {
            category: Category::Link,
            id: 2,
            rects: vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(10.0, 0.0, 20.0, 5.3)],
            visible: true,
            fixed: false,
            password: false,
            text: String::from("More"),
        };
        assert_eq!(
            added.to_string(),
            "DOM#add#1#2#0.0;0.0;10.0;10.0;10.0;0.0;20.0;5.3#1#0#0#More#"
        );
    }

    #[test]
    fn overflow_and_fixed_messages() {
        let added = Notification::OverflowAdded {
            id: 2,
            fixed: false,
            rect: Rect::new(10.0, 20.0, 310.0, 420.0),
            max_scroll: ScrollOffset::new(100.0, 50.0),
        };
        assert_eq!(added.to_string(), "#ovrflow#add#02#10;20;310;420#100;50#");

        let moved = Notification::OverflowUpdated {
            id: 2,
            change: OverflowChange::Rects(vec![Rect::new(0.5, 0.0, 1.0, 1.0)]),
        };
        assert_eq!(moved.to_string(), "#ovrflow#upd#2#rect#0.5;0;1;1#");
        assert_eq!(
            Notification::OverflowRemoved { id: 2 }.to_string(),
            "#ovrflow#rem#2"
        );
        assert_eq!(
            Notification::FixedAdded { id: 4, rects: Vec::new() }.to_string(),
            "#fixElem#add#4##"
        );
        assert_eq!(Notification::FixedRemoved { id: 4 }.to_string(), "#fixElem#rem#4");
    }

    #[test]
    fn channel_sink_forwards_lines() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(sender);
        emit(&mut sink, &Notification::OverflowRemoved { id: 9 });
        assert_eq!(receiver.try_recv().unwrap(), "#ovrflow#rem#9");
    }
}
