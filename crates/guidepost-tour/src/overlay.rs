#![forbid(unsafe_code)]

//! What the host should draw for the current step.

use guidepost_core::geometry::Rect;
use guidepost_layout::{PlacementResult, Side};

use crate::step::TourStep;

/// Which placement pass produced the tooltip position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementPhase {
    /// Computed immediately on step entry, possibly mid-scroll.
    Approximate,
    /// Recomputed after the scroll settled.
    Precise,
}

impl PlacementPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            PlacementPhase::Approximate => "approximate",
            PlacementPhase::Precise => "precise",
        }
    }
}

/// Spotlight and tooltip for the active step.
///
/// Only exists while a session is active and the step's target resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourOverlay<'a> {
    pub step_index: usize,
    pub step_count: usize,
    pub step: &'a TourStep,
    /// Target bounds the placement was computed from.
    pub target: Rect,
    pub spotlight: Option<Rect>,
    pub tooltip: PlacementResult,
    pub side: Side,
    pub phase: PlacementPhase,
    /// The step waits for the user to act on the target.
    pub gated: bool,
    pub can_retreat: bool,
    pub can_advance: bool,
    pub is_last: bool,
}

impl TourOverlay<'_> {
    /// "3 / 9"
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.step_index + 1, self.step_count)
    }

    /// Label for the forward button.
    pub fn next_label(&self) -> &'static str {
        if self.is_last { "Finish" } else { "Next" }
    }
}
