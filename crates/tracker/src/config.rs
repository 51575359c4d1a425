//! Tuning knobs for the tracker.
//!
//! Values can be constructed programmatically or read from the environment
//! the embedding host launches the page context with.

use log::warn;
use std::env;

/// Hard ceiling on the scroll delta applied per gaze scroll request.
pub const MAX_SCROLL_STEP: f64 = 10.0;

/// Runtime configuration for page instrumentation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Largest scroll delta (in CSS pixels) applied per scroll request
    pub scroll_step: f64,
    /// Edge band for gaze scrolling, as a fraction of half the visible size
    pub scroll_band: f64,
    /// Opacity below which a node or ancestor hides the node
    pub opacity_epsilon: f64,
    /// Zoom factor assumed when the page reports none
    pub default_zoom: f64,
}

impl TrackerConfig {
    /// Construct a configuration with explicit values.
    ///
    /// # Arguments
    ///
    /// * `scroll_step` - Maximum scroll delta per request, capped at [`MAX_SCROLL_STEP`]
    /// * `scroll_band` - Edge band fraction of half the container size
    /// * `opacity_epsilon` - Near-zero opacity threshold
    /// * `default_zoom` - Zoom assumed when the page reports none
    #[inline]
    #[must_use]
    pub const fn new(
        scroll_step: f64,
        scroll_band: f64,
        opacity_epsilon: f64,
        default_zoom: f64,
    ) -> Self {
        let step = if scroll_step > MAX_SCROLL_STEP {
            MAX_SCROLL_STEP
        } else {
            scroll_step
        };
        Self {
            scroll_step: step,
            scroll_band,
            opacity_epsilon,
            default_zoom,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GAZE_SCROLL_STEP`: Maximum scroll delta per request (default: 10, capped at 10)
    /// - `GAZE_SCROLL_BAND`: Edge band fraction of half the visible size (default: 0.2)
    /// - `GAZE_OPACITY_EPSILON`: Opacity treated as invisible (default: 0.0001)
    /// - `GAZE_DEFAULT_ZOOM`: Zoom used when the page reports none (default: 1.0)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let scroll_step = read_positive("GAZE_SCROLL_STEP")
            .unwrap_or(defaults.scroll_step)
            .min(MAX_SCROLL_STEP);
        let scroll_band = read_positive("GAZE_SCROLL_BAND")
            .filter(|band| {
                if *band > 1.0 {
                    warn!("ignoring GAZE_SCROLL_BAND={band}: must not exceed 1");
                }
                *band <= 1.0
            })
            .unwrap_or(defaults.scroll_band);
        let opacity_epsilon =
            read_positive("GAZE_OPACITY_EPSILON").unwrap_or(defaults.opacity_epsilon);
        let default_zoom = read_positive("GAZE_DEFAULT_ZOOM").unwrap_or(defaults.default_zoom);
        Self {
            scroll_step,
            scroll_band,
            opacity_epsilon,
            default_zoom,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(MAX_SCROLL_STEP, 0.2, 0.0001, 1.0)
    }
}

fn read_positive(name: &str) -> Option<f64> {
    let raw = env::var(name).ok()?;
    parse_positive(&raw).or_else(|| {
        warn!("ignoring {name}={raw:?}: expected a positive number");
        None
    })
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|val| val.is_finite() && *val > 0.0)
}
