#![forbid(unsafe_code)]

//! Scroll-into-view decisions.

use guidepost_core::geometry::{Point, Rect, Size};

/// Whether `target` is not fully inside the viewport inset by `margin`.
pub fn needs_scroll(target: &Rect, viewport: Size, margin: f64) -> bool {
    if !target.is_finite() {
        return false;
    }
    let safe = Rect::from_size(viewport).inflate(-margin.max(0.0));
    !safe.contains_rect(target)
}

/// Offset that moves `target` to the center of the viewport.
///
/// Adding the returned delta to the target origin centers it; a host
/// scrolls its document by the negated delta.
pub fn center_offset(target: &Rect, viewport: Size) -> Point {
    Point::new(
        viewport.width / 2.0 - target.center_x(),
        viewport.height / 2.0 - target.center_y(),
    )
}
