use dom::NodeKey;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Conditions the tracker reports instead of failing.
///
/// None of these abort instrumentation: entry points log them through
/// [`report`] and hand back `None`/`false`.
#[derive(Debug)]
pub enum TrackError {
    /// The node carries no category tag.
    MissingCategory(NodeKey),
    /// The category tag does not name a known category.
    UnknownCategory(String),
    /// The node carries no id tag.
    MissingId(NodeKey),
    /// The id tag is not a number.
    InvalidId(String),
    /// No live proxy under this id in the named registry.
    UnknownId { registry: &'static str, id: u32 },
    /// The node cannot be tracked because it is not an element.
    NotAnElement(NodeKey),
    /// Text entry was requested on a proxy that is not a text input.
    NotTextInput(u32),
    /// Submission was requested but no enclosing form exists.
    NoFormFound(u32),
    /// The DOM refused an operation.
    Dom(String),
}

impl Display for TrackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingCategory(node) => write!(f, "node {} has no category", node.0),
            Self::UnknownCategory(raw) => write!(f, "unknown category '{raw}'"),
            Self::MissingId(node) => write!(f, "node {} has no id", node.0),
            Self::InvalidId(raw) => write!(f, "invalid id '{raw}'"),
            Self::UnknownId { registry, id } => write!(f, "no {registry} with id {id}"),
            Self::NotAnElement(node) => write!(f, "node {} is not an element", node.0),
            Self::NotTextInput(id) => write!(f, "node {id} is not a text input"),
            Self::NoFormFound(id) => write!(f, "no form found for text input {id}"),
            Self::Dom(message) => write!(f, "DOM error: {message}"),
        }
    }
}

impl Error for TrackError {}

/// Log a tracker error with the host-visible error prefix.
pub fn report(err: &TrackError) {
    log::error!("ERROR: {err}");
}
