#![forbid(unsafe_code)]

//! Placement math for walkthrough overlays.
//!
//! Everything in this crate is a pure function of its inputs: no clock, no
//! render tree, no side effects. The engine calls into it on every step
//! change and on every resize/scroll.
//!
//! - [`placement`] - tooltip coordinates for a target and preferred side
//! - [`spotlight`] - the highlighted region around the target
//! - [`visibility`] - whether a target needs scrolling into view
//!
//! # Algorithm
//!
//! ```text
//! right:  x = rect.right + gap;                 y = center_vertically(rect, tooltip)
//! left:   x = rect.left - tooltip.width - gap;  y = center_vertically(rect, tooltip)
//! bottom: x = center_horizontally(rect, tooltip); y = rect.bottom + gap
//! top:    x = center_horizontally(rect, tooltip); y = rect.top - tooltip.height - gap
//! x = clamp(x, margin, viewport.width  - tooltip.width  - margin)
//! y = clamp(y, margin, viewport.height - tooltip.height - margin)
//! ```
//!
//! # Invariants
//!
//! 1. When the viewport can hold the tooltip plus both margins, the result
//!    lies in `[margin, viewport - tooltip - margin]` on each axis.
//! 2. When it cannot, the axis is pinned to `margin`.
//! 3. Non-finite inputs never propagate: the affected axis is pinned to `margin`.

pub mod placement;
pub mod spotlight;
pub mod visibility;

pub use guidepost_core::geometry::{Point, Rect, Size};
pub use placement::{PlacementConfig, PlacementResult, Side, candidate_position, place_tooltip};
pub use spotlight::spotlight_rect;
pub use visibility::{center_offset, needs_scroll};
