#![forbid(unsafe_code)]

//! Session state.
//!
//! | State                        | status   | gating                |
//! |------------------------------|----------|-----------------------|
//! | `Inactive`                   | Inactive | Free                  |
//! | `Active.Free`                | Active   | Free                  |
//! | `Active.WaitingForInteraction` | Active | WaitingForInteraction |
//! | `Terminal(reason)`           | Terminal | Free                  |
//!
//! `0 <= current_index < catalog.len()` holds whenever the status is Active.

use std::fmt;

use guidepost_runtime::SessionId;
use serde::Serialize;

use crate::catalog::StepCatalog;
use crate::step::TourStep;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalReason {
    Completed,
    Skipped,
}

impl TerminalReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            TerminalReason::Completed => "completed",
            TerminalReason::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourStatus {
    Inactive,
    Active,
    Terminal(TerminalReason),
}

/// Whether the current step still waits for a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gating {
    #[default]
    Free,
    WaitingForInteraction,
}

/// Flattened view of status + gating, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourState {
    Inactive,
    ActiveFree,
    ActiveWaiting,
    Terminal(TerminalReason),
}

impl TourState {
    pub const fn is_active(self) -> bool {
        matches!(self, TourState::ActiveFree | TourState::ActiveWaiting)
    }
}

impl fmt::Display for TourState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourState::Inactive => f.write_str("Inactive"),
            TourState::ActiveFree => f.write_str("Active.Free"),
            TourState::ActiveWaiting => f.write_str("Active.WaitingForInteraction"),
            TourState::Terminal(TerminalReason::Completed) => f.write_str("Terminal(Completed)"),
            TourState::Terminal(TerminalReason::Skipped) => f.write_str("Terminal(Skipped)"),
        }
    }
}

/// One activation of the walkthrough. Its steps are fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct TourSession {
    id: SessionId,
    catalog: StepCatalog,
    current_index: usize,
    status: TourStatus,
    gating: Gating,
}

impl TourSession {
    /// A fresh Active session positioned at step 0.
    pub(crate) fn begin(id: SessionId, catalog: StepCatalog) -> Self {
        let gating = gating_for(&catalog[0]);
        Self {
            id,
            catalog,
            current_index: 0,
            status: TourStatus::Active,
            gating,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn status(&self) -> TourStatus {
        self.status
    }

    pub fn gating(&self) -> Gating {
        self.gating
    }

    /// Set only once the session is Terminal.
    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        match self.status {
            TourStatus::Terminal(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn current_step(&self) -> &TourStep {
        &self.catalog[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index == self.catalog.last_index()
    }

    pub fn state(&self) -> TourState {
        match (self.status, self.gating) {
            (TourStatus::Inactive, _) => TourState::Inactive,
            (TourStatus::Active, Gating::Free) => TourState::ActiveFree,
            (TourStatus::Active, Gating::WaitingForInteraction) => TourState::ActiveWaiting,
            (TourStatus::Terminal(reason), _) => TourState::Terminal(reason),
        }
    }

    /// Move to `index` and recompute gating from that step.
    pub(crate) fn move_to(&mut self, index: usize) {
        debug_assert!(index < self.catalog.len());
        self.current_index = index.min(self.catalog.last_index());
        self.gating = gating_for(self.current_step());
    }

    pub(crate) fn release_gate(&mut self) {
        self.gating = Gating::Free;
    }

    pub(crate) fn finish(&mut self, reason: TerminalReason) {
        self.status = TourStatus::Terminal(reason);
        self.gating = Gating::Free;
    }
}

fn gating_for(step: &TourStep) -> Gating {
    if step.requires_interaction {
        Gating::WaitingForInteraction
    } else {
        Gating::Free
    }
}
