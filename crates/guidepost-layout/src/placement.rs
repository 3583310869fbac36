#![forbid(unsafe_code)]

//! Tooltip placement: candidate per side, then clamp into the viewport.

use guidepost_core::geometry::{Point, Rect, Size};

/// Preferred side of the target on which the tooltip is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Side {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Parse a side name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Spacing constants for tooltip placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    /// Minimum distance between the tooltip and the viewport edge.
    pub margin: f64,
    /// Distance between the target edge and the tooltip.
    pub gap: f64,
}

impl PlacementConfig {
    pub const DEFAULT_MARGIN: f64 = 12.0;
    pub const DEFAULT_GAP: f64 = 12.0;

    pub const fn new(margin: f64, gap: f64) -> Self {
        Self { margin, gap }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARGIN, Self::DEFAULT_GAP)
    }
}

/// Final tooltip coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    pub x: f64,
    pub y: f64,
    /// Whether either axis had to be pulled back into the viewport.
    pub clamped: bool,
}

impl PlacementResult {
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Unclamped tooltip position for `side`.
pub fn candidate_position(target: &Rect, side: Side, tooltip: Size, gap: f64) -> Point {
    match side {
        Side::Right => Point::new(target.right() + gap, center_vertically(target, tooltip)),
        Side::Left => Point::new(
            target.left() - tooltip.width - gap,
            center_vertically(target, tooltip),
        ),
        Side::Bottom => Point::new(center_horizontally(target, tooltip), target.bottom() + gap),
        Side::Top => Point::new(
            center_horizontally(target, tooltip),
            target.top() - tooltip.height - gap,
        ),
    }
}

/// Place a tooltip next to `target`, clamped into `viewport`.
pub fn place_tooltip(
    target: &Rect,
    side: Side,
    viewport: Size,
    tooltip: Size,
    config: PlacementConfig,
) -> PlacementResult {
    let candidate = candidate_position(target, side, tooltip, config.gap);
    let x = clamp_axis(candidate.x, config.margin, viewport.width, tooltip.width);
    let y = clamp_axis(candidate.y, config.margin, viewport.height, tooltip.height);
    let clamped = x != candidate.x || y != candidate.y;
    if clamped {
        guidepost_core::trace!(
            side = side.as_str(),
            candidate_x = candidate.x,
            candidate_y = candidate.y,
            x,
            y,
            "tooltip clamped into viewport"
        );
    }
    PlacementResult { x, y, clamped }
}

#[inline]
fn center_horizontally(target: &Rect, tooltip: Size) -> f64 {
    target.left() + (target.width - tooltip.width) / 2.0
}

#[inline]
fn center_vertically(target: &Rect, tooltip: Size) -> f64 {
    target.top() + (target.height - tooltip.height) / 2.0
}

/// Clamp one axis into `[margin, extent - size - margin]`.
///
/// `f64::clamp` panics when the bounds cross, so the degenerate case
/// (viewport too small) is handled first and pins to `margin`.
pub fn clamp_axis(value: f64, margin: f64, extent: f64, size: f64) -> f64 {
    let lo = if margin.is_finite() { margin } else { 0.0 };
    let hi = extent - size - lo;
    if !value.is_finite() || !hi.is_finite() || hi < lo {
        return lo;
    }
    value.clamp(lo, hi)
}
