//! Page instrumentation for gaze-driven browsing.
//!
//! The tracker mirrors a handful of interesting DOM elements (text inputs,
//! links, overflow containers and fixed-position elements) as proxy objects,
//! keeps their screen-space rectangles current, and posts a compact
//! `#`-delimited protocol line to the embedding host whenever something the
//! host cares about changes.
//!
//! Everything hangs off a [`PageInstrumentation`] context: the host calls
//! its entry points from DOM mutation callbacks, the per-frame tick and gaze
//! scroll requests. All work is synchronous and single threaded.
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
#![allow(
    clippy::float_cmp,
    reason = "Rect change detection compares coordinates exactly"
)]

pub mod category;
pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod instrumentation;
pub mod notify;
pub mod proxies;
pub mod registry;
pub mod walk;

pub use category::{Category, CategoryTable};
pub use config::TrackerConfig;
pub use error::TrackError;
pub use instrumentation::{PageInstrumentation, PageSnapshot};
pub use notify::{ChannelSink, ConsoleSink, Notification, NotificationSink, RecordingSink};
pub use proxies::{FixedElement, OverflowContainer, TrackedNode};
pub use registry::Registry;
