#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Defaults suit a desktop dashboard. `GUIDEPOST_*` environment variables
//! overlay them; the demo CLI overlays the environment. Flag-store keys
//! are not configuration: they belong to the
//! [`PersistenceBridge`](crate::PersistenceBridge) that reads and writes them.
//!
//! | Variable                     | Field                | Format   |
//! |------------------------------|----------------------|----------|
//! | `GUIDEPOST_MARGIN`           | `placement.margin`   | float    |
//! | `GUIDEPOST_GAP`              | `placement.gap`      | float    |
//! | `GUIDEPOST_TOOLTIP`          | `tooltip_size`       | `WxH`    |
//! | `GUIDEPOST_NAV_SETTLE_MS`    | `navigation_settle`  | integer  |
//! | `GUIDEPOST_SCROLL_SETTLE_MS` | `scroll_settle`      | integer  |
//! | `GUIDEPOST_WELCOME`          | `welcome_gate`       | `0`/`1`  |

use std::time::Duration;

use guidepost_core::geometry::Size;
use guidepost_layout::PlacementConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    pub placement: PlacementConfig,
    pub tooltip_size: Size,
    pub spotlight_padding: f64,
    /// Fallback wait after an interaction before advancing.
    pub navigation_settle: Duration,
    /// Fallback wait after scroll-into-view before precise placement.
    pub scroll_settle: Duration,
    /// Show a welcome gate before eligible starts.
    pub welcome_gate: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            tooltip_size: Size::new(320.0, 180.0),
            spotlight_padding: 8.0,
            navigation_settle: Duration::from_millis(400),
            scroll_settle: Duration::from_millis(300),
            welcome_gate: true,
        }
    }
}

impl TourConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_from(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from `lookup` (an environment-like source).
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = parsed(&lookup, "GUIDEPOST_MARGIN", parse_length) {
            self.placement.margin = v;
        }
        if let Some(v) = parsed(&lookup, "GUIDEPOST_GAP", parse_length) {
            self.placement.gap = v;
        }
        if let Some(v) = parsed(&lookup, "GUIDEPOST_TOOLTIP", parse_size) {
            self.tooltip_size = v;
        }
        if let Some(v) = parsed(&lookup, "GUIDEPOST_NAV_SETTLE_MS", parse_millis) {
            self.navigation_settle = v;
        }
        if let Some(v) = parsed(&lookup, "GUIDEPOST_SCROLL_SETTLE_MS", parse_millis) {
            self.scroll_settle = v;
        }
        if let Some(v) = parsed(&lookup, "GUIDEPOST_WELCOME", parse_switch) {
            self.welcome_gate = v;
        }
    }

    pub fn with_settle(mut self, navigation: Duration, scroll: Duration) -> Self {
        self.navigation_settle = navigation;
        self.scroll_settle = scroll;
        self
    }

    pub fn with_welcome_gate(mut self, enabled: bool) -> Self {
        self.welcome_gate = enabled;
        self
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
    }
    value
}

fn parse_length(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.parse::<u64>().ok().map(Duration::from_millis)
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `WIDTHxHEIGHT` (e.g. `320x180`).
pub fn parse_size(raw: &str) -> Option<Size> {
    let (w, h) = raw.split_once(['x', 'X'])?;
    let width = parse_length(w.trim())?;
    let height = parse_length(h.trim())?;
    Some(Size::new(width, height))
}
