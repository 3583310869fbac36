#![forbid(unsafe_code)]

//! The walkthrough state machine.
//!
//! # States
//!
//! ```text
//!              start / restart
//!   Inactive ─────────────────────► Active.Free ◄──────────────┐
//!      ▲                              │    ▲                   │ settle timer
//!      │                      advance │    │ advance/retreat   │ (or navigation_settled)
//!      │                              ▼    │                   │
//!      │                  Active.WaitingForInteraction ────────┘
//!      │                              │      interaction: disarm, navigate?, schedule
//!      │             skip (any Active)│
//!      │                              ▼
//!      └──── restart ──── Terminal(Completed | Skipped)
//! ```
//!
//! # Invariants
//!
//! 1. While Active, `0 <= index < catalog.len()`.
//! 2. The gate is armed only while the current step is WaitingForInteraction,
//!    and only for the current step.
//! 3. Every step entry and every teardown bumps the epoch, disarms the gate
//!    and clears the timer queue before anything else happens. A gate fire
//!    or continuation carrying an older epoch is ignored.
//! 4. The gate is armed after the step's placement pass, never before.
//!
//! # Failure Modes
//!
//! | Condition               | Behavior                                             |
//! |-------------------------|------------------------------------------------------|
//! | Target not found        | Stay Active, no overlay, re-resolve on every layout  |
//! | Navigation rejected     | Logged at warn, the settle advance still happens     |
//! | Remote notice failed    | Logged at warn by the persistence bridge             |
//! | Operation in wrong state| `TourError::InvalidTransition`, state unchanged      |
//! | Second live controller  | `TourError::SessionTaken` from the constructor       |

use std::fmt;
use std::time::Duration;

use guidepost_core::geometry::Rect;
use guidepost_layout::{PlacementResult, needs_scroll, place_tooltip, spotlight_rect};
use guidepost_runtime::{SessionId, TimerId, TimerQueue, now_unix_ms};

use crate::catalog::{CatalogError, StepCatalog};
use crate::config::TourConfig;
use crate::gate::{GateError, InteractionGate};
use crate::host::{ListenerId, TourHost};
use crate::locator::{ElementLocator, Located};
use crate::overlay::{PlacementPhase, TourOverlay};
use crate::persistence::PersistenceBridge;
use crate::session::{Gating, TerminalReason, TourSession, TourState, TourStatus};
use crate::slot::{SessionClaim, SessionSlot};
use crate::trigger::{EligibilityContext, TriggerBus, TriggerSignal, WelcomeGate};

// ─────────────────────────────────────────────────────────────────────────────
// Events and errors
// ─────────────────────────────────────────────────────────────────────────────

/// Why the step index changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvanceReason {
    Next,
    Back,
    /// The settle delay after a satisfied interaction elapsed.
    Interaction,
    /// `start` or `restart` while already active.
    Restart,
}

impl AdvanceReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            AdvanceReason::Next => "next",
            AdvanceReason::Back => "back",
            AdvanceReason::Interaction => "interaction",
            AdvanceReason::Restart => "restart",
        }
    }
}

/// Observable outcome of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourEvent {
    Activated {
        session: SessionId,
        index: usize,
    },
    StepChanged {
        from: usize,
        to: usize,
        reason: AdvanceReason,
    },
    /// The gate was satisfied; an advance is scheduled.
    InteractionAccepted {
        index: usize,
        navigated: bool,
    },
    Deactivated {
        reason: TerminalReason,
        index: usize,
    },
    WelcomeShown,
    WelcomeClosed,
}

impl TourEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            TourEvent::Activated { .. } => "activated",
            TourEvent::StepChanged { .. } => "step_changed",
            TourEvent::InteractionAccepted { .. } => "interaction_accepted",
            TourEvent::Deactivated { .. } => "deactivated",
            TourEvent::WelcomeShown => "welcome_shown",
            TourEvent::WelcomeClosed => "welcome_closed",
        }
    }
}

#[derive(Debug)]
pub enum TourError {
    /// The operation is not valid in the current state. A host integration bug.
    InvalidTransition { op: &'static str, state: TourState },
    /// Another controller already owns the session slot.
    SessionTaken,
    Catalog(CatalogError),
    Gate(GateError),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::InvalidTransition { op, state } => {
                write!(f, "`{op}` is not valid in state {state}")
            }
            TourError::SessionTaken => f.write_str("another walkthrough controller is alive"),
            TourError::Catalog(e) => write!(f, "catalog error: {e}"),
            TourError::Gate(e) => write!(f, "gate error: {e}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::InvalidTransition { .. } | TourError::SessionTaken => None,
            TourError::Catalog(e) => Some(e),
            TourError::Gate(e) => Some(e),
        }
    }
}

impl From<CatalogError> for TourError {
    fn from(e: CatalogError) -> Self {
        TourError::Catalog(e)
    }
}

impl From<GateError> for TourError {
    fn from(e: GateError) -> Self {
        TourError::Gate(e)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Payload carried by an armed gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GateToken {
    epoch: u64,
    index: usize,
}

/// Scheduled work, tagged with the epoch that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    PrecisePlacement { epoch: u64 },
    SettleAdvance { epoch: u64 },
}

/// Placement computed for the current step.
#[derive(Debug, Clone, Copy)]
struct StepView {
    target: Rect,
    tooltip: PlacementResult,
    spotlight: Option<Rect>,
    phase: PlacementPhase,
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the single walkthrough session.
///
/// All operations take the host explicitly; the controller never stores it.
/// At most one session exists at a time: a controller holds its
/// [`SessionSlot`] until dropped, and `start` while active resets the
/// existing session instead of creating a second one.
#[derive(Debug)]
pub struct TourController {
    _claim: SessionClaim,
    config: TourConfig,
    catalog: StepCatalog,
    persistence: PersistenceBridge,
    session: Option<TourSession>,
    gate: InteractionGate<GateToken>,
    timers: TimerQueue<Continuation>,
    pending_settle: Option<TimerId>,
    pending_precise: Option<TimerId>,
    view: Option<StepView>,
    welcome: WelcomeGate,
    epoch: u64,
    session_seed: u64,
    sessions_started: u64,
}

impl TourController {
    /// Build the process's controller. Fails with
    /// [`TourError::SessionTaken`] while another one built this way is alive.
    pub fn new(
        config: TourConfig,
        catalog: StepCatalog,
        persistence: PersistenceBridge,
    ) -> Result<Self, TourError> {
        Self::with_slot(SessionSlot::process(), config, catalog, persistence)
    }

    /// Build a controller that owns `slot` instead of the process-wide one.
    pub fn with_slot(
        slot: &SessionSlot,
        config: TourConfig,
        catalog: StepCatalog,
        persistence: PersistenceBridge,
    ) -> Result<Self, TourError> {
        let Some(claim) = slot.claim() else {
            tracing::warn!("walkthrough controller refused: session slot already claimed");
            return Err(TourError::SessionTaken);
        };
        Ok(Self {
            _claim: claim,
            config,
            catalog,
            persistence,
            session: None,
            gate: InteractionGate::new(),
            timers: TimerQueue::new(),
            pending_settle: None,
            pending_precise: None,
            view: None,
            welcome: WelcomeGate::default(),
            epoch: 0,
            session_seed: now_unix_ms(),
            sessions_started: 0,
        })
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn persistence(&self) -> &PersistenceBridge {
        &self.persistence
    }

    pub fn session(&self) -> Option<&TourSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> TourState {
        self.session
            .as_ref()
            .map_or(TourState::Inactive, TourSession::state)
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Current step index while active.
    pub fn current_index(&self) -> Option<usize> {
        self.active_session().map(TourSession::current_index)
    }

    pub fn is_gate_armed(&self) -> bool {
        self.gate.is_armed()
    }

    pub fn armed_listener(&self) -> Option<ListenerId> {
        self.gate.armed_listener()
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome.is_visible()
    }

    /// Whether an interaction-triggered advance is waiting on its settle delay.
    pub fn settle_pending(&self) -> bool {
        self.pending_settle.is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Virtual time, as driven by [`tick`](Self::tick).
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Replace the catalog used by the next session.
    pub fn replace_catalog(&mut self, catalog: StepCatalog) -> Result<(), TourError> {
        if self.is_active() {
            return Err(self.invalid("replace_catalog"));
        }
        self.catalog = catalog;
        Ok(())
    }

    pub fn load_catalog_json(&mut self, json: &str) -> Result<(), TourError> {
        let catalog = StepCatalog::from_json(json)?;
        self.replace_catalog(catalog)
    }

    // ── lifecycle ───────────────────────────────────────────────────────────

    /// Activate at step 0. While already active this resets the current
    /// session to step 0 rather than opening a second one.
    pub fn start<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Result<TourEvent, TourError> {
        let before = self.state();
        let event = if before.is_active() {
            tracing::debug!(state = %before, "start while active treated as restart");
            self.rewind(host)
        } else {
            self.activate(host)
        };
        self.log_transition("start", before);
        Ok(event)
    }

    /// Start a fresh session with `catalog`.
    pub fn start_with<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
        catalog: StepCatalog,
    ) -> Result<TourEvent, TourError> {
        self.replace_catalog(catalog)?;
        self.start(host)
    }

    /// Back to step 0 from any state.
    pub fn restart<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Result<TourEvent, TourError> {
        let before = self.state();
        let event = if before.is_active() {
            self.rewind(host)
        } else {
            self.activate(host)
        };
        self.log_transition("restart", before);
        Ok(event)
    }

    /// Next step, or completion on the last one. Only in Active.Free.
    ///
    /// A pending interaction advance is cancelled and replaced by this one.
    pub fn advance<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Result<TourEvent, TourError> {
        let before = self.state();
        if before != TourState::ActiveFree {
            return Err(self.invalid("advance"));
        }
        if let Some(id) = self.pending_settle.take() {
            self.timers.cancel(id);
            tracing::debug!("manual advance replaced pending settle advance");
        }
        let event = self.step_forward(host, AdvanceReason::Next);
        self.log_transition("advance", before);
        Ok(event)
    }

    /// Previous step. Only in Active.Free and past step 0.
    pub fn retreat<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Result<TourEvent, TourError> {
        let before = self.state();
        let index = match self.active_session() {
            Some(s) if before == TourState::ActiveFree && s.current_index() > 0 => {
                s.current_index()
            }
            _ => return Err(self.invalid("retreat")),
        };
        self.enter_step(host, index - 1);
        self.log_transition("retreat", before);
        Ok(TourEvent::StepChanged {
            from: index,
            to: index - 1,
            reason: AdvanceReason::Back,
        })
    }

    /// End the session from any Active state and any index.
    pub fn skip<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Result<TourEvent, TourError> {
        let before = self.state();
        if !before.is_active() {
            return Err(self.invalid("skip"));
        }
        let event = self.finish(host, TerminalReason::Skipped);
        self.log_transition("skip", before);
        Ok(event)
    }

    /// The user performed the current step's action.
    ///
    /// Disarms the gate, navigates to the step's route if it differs from the
    /// current one, then schedules the advance after the navigation settle
    /// delay. A rejected navigation does not block the advance.
    pub fn interaction_satisfied<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<TourEvent, TourError> {
        let before = self.state();
        if before != TourState::ActiveWaiting {
            return Err(self.invalid("interaction_satisfied"));
        }
        self.gate.disarm(host);
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("interaction_satisfied"));
        };
        session.release_gate();
        let index = session.current_index();
        let route = session.current_step().target_route.clone();

        let mut navigated = false;
        if let Some(route) = route
            && host.current_route() != route
        {
            match host.navigate(&route) {
                Ok(()) => navigated = true,
                Err(e) => {
                    tracing::warn!(route = %route, error = %e, "navigation_failure");
                }
            }
        }

        let epoch = self.epoch;
        let id = self
            .timers
            .schedule(self.config.navigation_settle, Continuation::SettleAdvance { epoch });
        self.pending_settle = Some(id);
        self.log_transition("interaction_satisfied", before);
        Ok(TourEvent::InteractionAccepted { index, navigated })
    }

    /// A listener attached by the gate fired.
    ///
    /// Stale or repeated fires are ignored and return `None`.
    pub fn element_interacted<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
        listener: ListenerId,
    ) -> Option<TourEvent> {
        let token = self.gate.fire(host, listener)?;
        let current = self.current_index();
        if token.epoch != self.epoch || current != Some(token.index) {
            tracing::debug!(%listener, epoch = token.epoch, "stale gate token ignored");
            return None;
        }
        match self.interaction_satisfied(host) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "gate fired outside of a gated step");
                None
            }
        }
    }

    /// Re-run placement after a resize or scroll. Index, status and gating
    /// are untouched. Returns whether the target resolved.
    pub fn layout_changed<H: TourHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.is_active() {
            return false;
        }
        let phase = self
            .view
            .map_or(PlacementPhase::Approximate, |view| view.phase);
        self.reposition(host, phase)
    }

    /// The host reports that scrolling finished: run the precise pass now.
    pub fn layout_settled<H: TourHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(id) = self.pending_precise.take() {
            self.timers.cancel(id);
        }
        self.reposition(host, PlacementPhase::Precise)
    }

    /// The host reports that the destination view mounted: perform the
    /// pending interaction advance now instead of waiting for the timer.
    pub fn navigation_settled<H: TourHost + ?Sized>(&mut self, host: &mut H) -> Option<TourEvent> {
        let id = self.pending_settle.take()?;
        self.timers.cancel(id);
        Some(self.settle_advance(host))
    }

    /// Advance virtual time, running every continuation that comes due.
    pub fn tick<H: TourHost + ?Sized>(&mut self, host: &mut H, delta: Duration) -> Vec<TourEvent> {
        let until = self.timers.now().saturating_add(delta);
        let mut events = Vec::new();
        while let Some(fired) = self.timers.pop_due(until) {
            match fired.payload {
                Continuation::PrecisePlacement { epoch } if epoch == self.epoch => {
                    self.pending_precise = None;
                    self.reposition(host, PlacementPhase::Precise);
                }
                Continuation::SettleAdvance { epoch } if epoch == self.epoch => {
                    self.pending_settle = None;
                    events.push(self.settle_advance(host));
                }
                stale => {
                    tracing::debug!(timer = %fired.id, ?stale, "stale continuation ignored");
                }
            }
        }
        self.timers.settle_at(until);
        events
    }

    /// Spotlight and tooltip for the current step, if there is anything to draw.
    pub fn overlay(&self) -> Option<TourOverlay<'_>> {
        let session = self.active_session()?;
        let view = self.view?;
        let free = session.gating() == Gating::Free;
        let step = session.current_step();
        Some(TourOverlay {
            step_index: session.current_index(),
            step_count: session.catalog().len(),
            step,
            target: view.target,
            spotlight: view.spotlight,
            tooltip: view.tooltip,
            side: step.preferred_side,
            phase: view.phase,
            gated: !free,
            can_retreat: free && session.current_index() > 0,
            can_advance: free,
            is_last: session.is_last(),
        })
    }

    // ── inbound signals and welcome gate ────────────────────────────────────

    pub fn handle_signal<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
        signal: TriggerSignal,
    ) -> Result<Option<TourEvent>, TourError> {
        tracing::debug!(signal = signal.name(), "trigger signal");
        match signal {
            TriggerSignal::StartDirect => self.start(host).map(Some),
            TriggerSignal::StartIfEligible(predicate) => self.start_if_eligible(host, predicate),
            TriggerSignal::RequestWelcome => self.request_welcome(host).map(Some),
            TriggerSignal::Restart => self.restart(host).map(Some),
        }
    }

    /// Apply every queued signal. Signals that are invalid in the current
    /// state are logged and dropped.
    pub fn pump<H: TourHost + ?Sized>(&mut self, host: &mut H, bus: &TriggerBus) -> Vec<TourEvent> {
        let mut events = Vec::new();
        for signal in bus.drain() {
            let name = signal.name();
            match self.handle_signal(host, signal) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => tracing::error!(signal = name, error = %e, "trigger signal rejected"),
            }
        }
        events
    }

    /// Start only if `predicate` accepts; opens the welcome gate first when
    /// configured to. Does nothing while a session is active.
    pub fn start_if_eligible<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
        predicate: impl FnOnce(&EligibilityContext<'_>) -> bool,
    ) -> Result<Option<TourEvent>, TourError> {
        if self.is_active() || self.welcome.is_visible() {
            return Ok(None);
        }
        let ctx = EligibilityContext {
            flags: self.persistence.flags(),
            keys: self.persistence.keys(),
        };
        if !predicate(&ctx) {
            tracing::debug!("walkthrough not eligible");
            return Ok(None);
        }
        if self.config.welcome_gate {
            self.request_welcome(host).map(Some)
        } else {
            self.start(host).map(Some)
        }
    }

    /// Open the welcome gate. Not valid while a session is active.
    pub fn request_welcome<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<TourEvent, TourError> {
        if self.is_active() {
            return Err(self.invalid("request_welcome"));
        }
        if self.welcome.open() {
            self.persistence.mark_welcome_shown();
            host.on_welcome(true);
        }
        Ok(TourEvent::WelcomeShown)
    }

    /// Close the welcome gate and start at step 0.
    pub fn accept_welcome<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<TourEvent, TourError> {
        if !self.welcome.is_visible() {
            return Err(self.invalid("accept_welcome"));
        }
        self.close_welcome(host);
        self.start(host)
    }

    /// Close the welcome gate and record a local skip.
    pub fn decline_welcome<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<TourEvent, TourError> {
        if !self.welcome.is_visible() {
            return Err(self.invalid("decline_welcome"));
        }
        self.close_welcome(host);
        self.persistence.record_decline();
        Ok(TourEvent::WelcomeClosed)
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn active_session(&self) -> Option<&TourSession> {
        self.session
            .as_ref()
            .filter(|s| s.status() == TourStatus::Active)
    }

    fn invalid(&self, op: &'static str) -> TourError {
        let state = self.state();
        tracing::debug!(op, state = %state, "invalid transition");
        TourError::InvalidTransition { op, state }
    }

    fn next_session_id(&mut self) -> SessionId {
        self.sessions_started += 1;
        SessionId(self.session_seed.wrapping_add(self.sessions_started))
    }

    fn close_welcome<H: TourHost + ?Sized>(&mut self, host: &mut H) {
        if self.welcome.close() {
            host.on_welcome(false);
        }
    }

    /// New session at step 0.
    fn activate<H: TourHost + ?Sized>(&mut self, host: &mut H) -> TourEvent {
        self.teardown(host);
        self.close_welcome(host);
        let id = self.next_session_id();
        self.session = Some(TourSession::begin(id, self.catalog.clone()));
        self.persistence.record_start(id);
        host.on_activate();
        self.enter_step(host, 0);
        TourEvent::Activated {
            session: id,
            index: 0,
        }
    }

    /// Existing active session back to step 0.
    fn rewind<H: TourHost + ?Sized>(&mut self, host: &mut H) -> TourEvent {
        let from = self.current_index().unwrap_or(0);
        self.enter_step(host, 0);
        TourEvent::StepChanged {
            from,
            to: 0,
            reason: AdvanceReason::Restart,
        }
    }

    fn step_forward<H: TourHost + ?Sized>(&mut self, host: &mut H, reason: AdvanceReason) -> TourEvent {
        let Some(session) = self.active_session() else {
            return TourEvent::Deactivated {
                reason: TerminalReason::Completed,
                index: 0,
            };
        };
        let index = session.current_index();
        if session.is_last() {
            return self.finish(host, TerminalReason::Completed);
        }
        self.enter_step(host, index + 1);
        TourEvent::StepChanged {
            from: index,
            to: index + 1,
            reason,
        }
    }

    fn settle_advance<H: TourHost + ?Sized>(&mut self, host: &mut H) -> TourEvent {
        let before = self.state();
        let event = self.step_forward(host, AdvanceReason::Interaction);
        self.log_transition("settle_advance", before);
        event
    }

    fn enter_step<H: TourHost + ?Sized>(&mut self, host: &mut H, index: usize) {
        self.epoch += 1;
        self.gate.disarm(host);
        self.timers.clear();
        self.pending_settle = None;
        self.pending_precise = None;
        self.view = None;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.move_to(index);
        let catalog = session.catalog().clone();
        let step = &catalog[index];

        let mut located = ElementLocator::locate(&*host, step);
        if let Some(target) = located
            && needs_scroll(&target.rect, host.viewport(), self.config.placement.margin)
        {
            host.scroll_into_view(target.element);
            located = host.bounding_rect(target.element).map(|rect| Located {
                element: target.element,
                rect,
            });
        }
        self.apply_placement(host, located, PlacementPhase::Approximate);

        let epoch = self.epoch;
        let id = self
            .timers
            .schedule(self.config.scroll_settle, Continuation::PrecisePlacement { epoch });
        self.pending_precise = Some(id);

        host.on_step_change(index, step);
    }

    fn reposition<H: TourHost + ?Sized>(&mut self, host: &mut H, phase: PlacementPhase) -> bool {
        let Some(session) = self.active_session() else {
            return false;
        };
        let located = ElementLocator::locate(&*host, session.current_step());
        self.apply_placement(host, located, phase)
    }

    /// Store placement for the current step and arm the gate if it waits
    /// on an interaction. Returns whether the target resolved.
    fn apply_placement<H: TourHost + ?Sized>(
        &mut self,
        host: &mut H,
        located: Option<Located>,
        phase: PlacementPhase,
    ) -> bool {
        let Some(session) = self.active_session() else {
            return false;
        };
        let index = session.current_index();
        let waiting = session.gating() == Gating::WaitingForInteraction;
        let side = session.current_step().preferred_side;

        let Some(target) = located else {
            self.view = None;
            if self.gate.is_armed() {
                self.gate.disarm(host);
            }
            return false;
        };

        let viewport = host.viewport();
        let tooltip = place_tooltip(
            &target.rect,
            side,
            viewport,
            self.config.tooltip_size,
            self.config.placement,
        );
        let spotlight = spotlight_rect(&target.rect, self.config.spotlight_padding, viewport);
        self.view = Some(StepView {
            target: target.rect,
            tooltip,
            spotlight,
            phase,
        });

        if waiting && self.gate.armed_element() != Some(target.element) {
            self.gate.disarm(host);
            let token = GateToken {
                epoch: self.epoch,
                index,
            };
            if let Err(e) = self.gate.arm(host, target.element, token) {
                tracing::error!(error = %e, "failed to arm interaction gate");
            }
        }
        true
    }

    fn finish<H: TourHost + ?Sized>(&mut self, host: &mut H, reason: TerminalReason) -> TourEvent {
        let index = self.current_index().unwrap_or(0);
        self.teardown(host);
        let Some(session) = self.session.as_mut() else {
            return TourEvent::Deactivated { reason, index };
        };
        session.finish(reason);
        let id = session.id();
        match reason {
            TerminalReason::Completed => self.persistence.record_complete(id),
            TerminalReason::Skipped => self.persistence.record_skip(id),
        }
        host.on_deactivate(reason);
        TourEvent::Deactivated { reason, index }
    }

    /// Drop every live gate, timer and placement.
    fn teardown<H: TourHost + ?Sized>(&mut self, host: &mut H) {
        self.epoch += 1;
        self.gate.disarm(host);
        let cancelled = self.timers.clear();
        if cancelled > 0 {
            tracing::debug!(cancelled, "pending continuations cancelled");
        }
        self.pending_settle = None;
        self.pending_precise = None;
        self.view = None;
    }

    fn log_transition(&self, op: &'static str, before: TourState) {
        let after = self.state();
        tracing::debug!(
            op,
            from = %before,
            to = %after,
            index = self.current_index(),
            "tour_transition"
        );
        self.debug_check_invariants();
    }

    fn debug_check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        match self.active_session() {
            Some(session) => {
                debug_assert!(session.current_index() < session.catalog().len());
                if let Some(token) = self.gate.armed_payload() {
                    debug_assert_eq!(session.gating(), Gating::WaitingForInteraction);
                    debug_assert_eq!(token.index, session.current_index());
                    debug_assert_eq!(token.epoch, self.epoch);
                }
            }
            None => {
                debug_assert!(!self.gate.is_armed());
                debug_assert!(self.timers.is_empty());
            }
        }
    }
}
