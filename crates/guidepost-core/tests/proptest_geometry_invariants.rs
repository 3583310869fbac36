//! Property-based invariant tests for geometry primitives (Rect, Size).
//!
//! 1. Intersection is commutative.
//! 2. Intersection result fits within both inputs.
//! 3. Right/bottom edges are consistent with x+width, y+height.
//! 4. Inflate then deflate restores non-degenerate rectangles.

use guidepost_core::geometry::Rect;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-2000i32..=2000, -2000i32..=2000, 0i32..=2000, 0i32..=2000)
        .prop_map(|(x, y, w, h)| Rect::new(x as f64, y as f64, w as f64, h as f64))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Intersection is commutative
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Intersection result fits within both inputs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_fits_within_both(a in rect_strategy(), b in rect_strategy()) {
        if let Some(inter) = a.intersection_opt(&b) {
            prop_assert!(a.contains_rect(&inter), "{:?} not inside {:?}", inter, a);
            prop_assert!(b.contains_rect(&inter), "{:?} not inside {:?}", inter, b);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Edge consistency
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edges_consistent(r in rect_strategy()) {
        prop_assert_eq!(r.right(), r.x + r.width);
        prop_assert_eq!(r.bottom(), r.y + r.height);
        prop_assert!(r.right() >= r.left());
        prop_assert!(r.bottom() >= r.top());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Inflate/deflate round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inflate_then_deflate(r in rect_strategy(), pad in 0i32..=64) {
        let pad = pad as f64;
        let back = r.inflate(pad).inflate(-pad);
        prop_assert_eq!(back, r);
    }
}
