//! Property-based invariant tests for tooltip placement.
//!
//! 1. Output lies in `[margin, viewport - tooltip - margin]` on both axes
//!    whenever the viewport can hold the tooltip plus both margins.
//! 2. Degenerate viewports pin the axis to `margin`.
//! 3. Targets fully inside the safe band, with room on the preferred side,
//!    are never clamped on the main axis.
//! 4. Placement is deterministic.
//! 5. Spotlight is always inside the viewport.

use guidepost_layout::{PlacementConfig, Rect, Side, Size, place_tooltip, spotlight_rect};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![
        Just(Side::Top),
        Just(Side::Bottom),
        Just(Side::Left),
        Just(Side::Right),
    ]
}

/// Rectangles anywhere, including far outside the viewport.
fn rect_strategy() -> impl Strategy<Value = Rect> {
    (
        -5000.0f64..5000.0,
        -5000.0f64..5000.0,
        0.0f64..3000.0,
        0.0f64..3000.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn size_strategy(max: f64) -> impl Strategy<Value = Size> {
    (0.0f64..max, 0.0f64..max).prop_map(|(w, h)| Size::new(w, h))
}

fn config_strategy() -> impl Strategy<Value = PlacementConfig> {
    (0.0f64..48.0, 0.0f64..48.0).prop_map(|(m, g)| PlacementConfig::new(m, g))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Output within bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn placement_within_bounds(
        target in rect_strategy(),
        side in side_strategy(),
        viewport in size_strategy(4000.0),
        tooltip in size_strategy(800.0),
        config in config_strategy(),
    ) {
        let p = place_tooltip(&target, side, viewport, tooltip, config);
        let max_x = viewport.width - tooltip.width - config.margin;
        let max_y = viewport.height - tooltip.height - config.margin;

        if max_x >= config.margin {
            prop_assert!(p.x >= config.margin && p.x <= max_x, "x={} not in [{}, {}]", p.x, config.margin, max_x);
        } else {
            prop_assert_eq!(p.x, config.margin);
        }
        if max_y >= config.margin {
            prop_assert!(p.y >= config.margin && p.y <= max_y, "y={} not in [{}, {}]", p.y, config.margin, max_y);
        } else {
            prop_assert_eq!(p.y, config.margin);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Degenerate viewports
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tiny_viewport_pins_to_margin(
        target in rect_strategy(),
        side in side_strategy(),
        margin in 1.0f64..32.0,
    ) {
        let tooltip = Size::new(320.0, 180.0);
        let viewport = Size::new(tooltip.width, tooltip.height);
        let p = place_tooltip(&target, side, viewport, tooltip, PlacementConfig::new(margin, 8.0));
        prop_assert_eq!(p.x, margin);
        prop_assert_eq!(p.y, margin);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Roomy targets are not clamped on the main axis
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn roomy_right_side_keeps_gap(
        x in 100.0f64..300.0,
        y in 300.0f64..400.0,
    ) {
        let viewport = Size::new(1600.0, 900.0);
        let tooltip = Size::new(300.0, 150.0);
        let target = Rect::new(x, y, 100.0, 40.0);
        let config = PlacementConfig::new(12.0, 10.0);
        let p = place_tooltip(&target, Side::Right, viewport, tooltip, config);
        prop_assert_eq!(p.x, target.right() + config.gap);
        prop_assert!(!p.clamped);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn placement_deterministic(
        target in rect_strategy(),
        side in side_strategy(),
        viewport in size_strategy(4000.0),
        tooltip in size_strategy(800.0),
    ) {
        let a = place_tooltip(&target, side, viewport, tooltip, PlacementConfig::default());
        let b = place_tooltip(&target, side, viewport, tooltip, PlacementConfig::default());
        prop_assert_eq!(a, b);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Spotlight inside viewport
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn spotlight_inside_viewport(
        target in rect_strategy(),
        viewport in size_strategy(4000.0),
        padding in 0.0f64..32.0,
    ) {
        if let Some(rect) = spotlight_rect(&target, padding, viewport) {
            let eps = 1e-6;
            prop_assert!(rect.left() >= 0.0 && rect.top() >= 0.0, "{:?}", rect);
            prop_assert!(rect.right() <= viewport.width + eps, "{:?}", rect);
            prop_assert!(rect.bottom() <= viewport.height + eps, "{:?}", rect);
            prop_assert!(!rect.is_empty());
        }
    }
}
