#![forbid(unsafe_code)]

//! Target resolution.
//!
//! Resolves a step's selector against the live render tree every time it
//! is asked. Handles are never cached between calls: the host may replace
//! elements between renders.

use guidepost_core::geometry::Rect;

use crate::host::{ElementHandle, RenderTree};
use crate::step::TourStep;

/// A resolved target: the element and its viewport-relative bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub element: ElementHandle,
    pub rect: Rect,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ElementLocator;

impl ElementLocator {
    /// Resolve `step`'s target, or `None` (TargetNotFound, logged at warn).
    pub fn locate<R: RenderTree + ?Sized>(tree: &R, step: &TourStep) -> Option<Located> {
        let found = tree
            .locate(&step.target_selector)
            .and_then(|element| {
                let rect = tree.bounding_rect(element)?;
                rect.is_finite().then_some(Located { element, rect })
            });
        if found.is_none() {
            tracing::warn!(
                step_id = %step.id,
                selector = %step.target_selector,
                "target_not_found"
            );
        }
        found
    }
}
