#![forbid(unsafe_code)]

//! Spotlight geometry: the cut-out region drawn around the current target.

use guidepost_core::geometry::{Rect, Size};

/// Inflate `target` by `padding` and clip it to the viewport.
///
/// Returns `None` when nothing of the padded target is visible.
pub fn spotlight_rect(target: &Rect, padding: f64, viewport: Size) -> Option<Rect> {
    let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };
    target
        .inflate(padding)
        .intersection_opt(&Rect::from_size(viewport))
}
