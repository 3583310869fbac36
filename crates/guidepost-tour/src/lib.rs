#![forbid(unsafe_code)]

//! Guided walkthrough engine.
//!
//! Sequences a catalog of UI stops over a render tree the engine does not
//! own. Some stops must be *performed* (a click on the highlighted element)
//! before the tour moves on; performing them may navigate to another page.
//!
//! # Key Components
//!
//! - [`StepCatalog`] - immutable ordered list of [`TourStep`]s
//! - [`ElementLocator`] - resolves a step's selector against the live tree
//! - [`InteractionGate`] - one-shot bridge from a user action to "advance"
//! - [`PersistenceBridge`] - durable completion/skip flags + remote notices
//! - [`TourController`] - the state machine
//! - [`SessionSlot`] - admits one live controller per slot
//! - [`TriggerBus`] / [`WelcomeGate`] - inbound start/restart signals
//!
//! # Control flow
//!
//! ```text
//! TriggerBus ──► TourController ──► ElementLocator ──► placement (guidepost-layout)
//!                     │                                   │
//!                     │◄──────── InteractionGate ◄────────┘ (armed after placement)
//!                     │
//!                     ├──► Router::navigate (optional) ──► settle timer ──► advance
//!                     └──► PersistenceBridge on Completed / Skipped
//! ```
//!
//! # Concurrency
//!
//! Single-threaded and event driven. Every transition runs inside one call
//! from the host (`advance`, `element_interacted`, `tick`, ...). Settle
//! delays are entries in the controller's own [`TimerQueue`], advanced by
//! [`TourController::tick`], so `skip` and `restart` cancel them synchronously.
//!
//! [`TimerQueue`]: guidepost_runtime::TimerQueue

pub mod catalog;
pub mod config;
pub mod controller;
pub mod gate;
pub mod host;
pub mod locator;
pub mod overlay;
pub mod persistence;
pub mod session;
pub mod slot;
pub mod step;
pub mod trigger;

pub use catalog::{CatalogError, StepCatalog};
pub use config::TourConfig;
pub use controller::{AdvanceReason, TourController, TourError, TourEvent};
pub use gate::{GateError, InteractionGate};
pub use host::memory::{HostEvent, MemoryHost};
pub use host::{
    ElementHandle, ListenerId, NavigationError, RenderTree, Router, TourHost, TourObserver,
};
pub use locator::{ElementLocator, Located};
pub use overlay::{PlacementPhase, TourOverlay};
pub use persistence::{CompletionRecord, FlagKeys, PersistenceBridge};
pub use session::{Gating, TerminalReason, TourSession, TourState, TourStatus};
pub use slot::{SessionClaim, SessionSlot};
pub use step::{StepCategory, TourStep};
pub use trigger::{
    EligibilityContext, TriggerBus, TriggerSender, TriggerSignal, WelcomeGate, default_eligibility,
};

pub use guidepost_layout::{PlacementConfig, PlacementResult, Side};
