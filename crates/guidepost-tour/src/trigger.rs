#![forbid(unsafe_code)]

//! Inbound boundary: host-originated start signals and the welcome gate.
//!
//! Signals may be sent from anywhere (a help-menu handler, a post-login
//! hook, another thread). They queue on a channel and are applied by
//! [`TourController::pump`](crate::TourController::pump) on the UI thread,
//! so every transition still runs inside a single host call.
//!
//! Whether a user *should* see the walkthrough is the host's decision.
//! [`default_eligibility`] is the common policy, offered as an opt-in helper.

use std::fmt;
use std::sync::mpsc;

use guidepost_runtime::FlagRegistry;

use crate::persistence::FlagKeys;

/// Host-supplied "should this user see the tour" decision.
pub type EligibilityPredicate = Box<dyn FnOnce(&EligibilityContext<'_>) -> bool + Send>;

/// What an eligibility predicate gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityContext<'a> {
    pub flags: &'a FlagRegistry,
    pub keys: &'a FlagKeys,
}

impl EligibilityContext<'_> {
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key)
    }

    pub fn onboarding_completed(&self) -> bool {
        self.flag(&self.keys.onboarding_completed)
    }

    pub fn welcome_shown(&self) -> bool {
        self.flag(&self.keys.welcome_shown)
    }

    /// A previous session completed or was skipped.
    pub fn tour_finished(&self) -> bool {
        self.flag(&self.keys.completed) || self.flag(&self.keys.skipped)
    }
}

/// Onboarding finished, welcome never shown, and no finished session on record.
pub fn default_eligibility(ctx: &EligibilityContext<'_>) -> bool {
    ctx.onboarding_completed() && !ctx.welcome_shown() && !ctx.tour_finished()
}

pub enum TriggerSignal {
    /// Start at step 0, bypassing eligibility.
    StartDirect,
    /// Start (or open the welcome gate) only if the predicate agrees.
    StartIfEligible(EligibilityPredicate),
    /// Open the welcome gate again, e.g. from a help menu.
    RequestWelcome,
    Restart,
}

impl TriggerSignal {
    pub const fn name(&self) -> &'static str {
        match self {
            TriggerSignal::StartDirect => "start_direct",
            TriggerSignal::StartIfEligible(_) => "start_if_eligible",
            TriggerSignal::RequestWelcome => "request_welcome",
            TriggerSignal::Restart => "restart",
        }
    }
}

impl fmt::Debug for TriggerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Queue of pending trigger signals.
#[derive(Debug)]
pub struct TriggerBus {
    tx: mpsc::Sender<TriggerSignal>,
    rx: mpsc::Receiver<TriggerSignal>,
}

impl Default for TriggerBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> TriggerSender {
        TriggerSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every queued signal, oldest first.
    pub fn drain(&self) -> Vec<TriggerSignal> {
        self.rx.try_iter().collect()
    }
}

/// Cloneable handle for sending signals to a [`TriggerBus`].
#[derive(Debug, Clone)]
pub struct TriggerSender {
    tx: mpsc::Sender<TriggerSignal>,
}

impl TriggerSender {
    /// Queue a signal. Returns `false` once the bus is gone.
    pub fn send(&self, signal: TriggerSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    pub fn start_direct(&self) -> bool {
        self.send(TriggerSignal::StartDirect)
    }

    pub fn start_if_eligible(
        &self,
        predicate: impl FnOnce(&EligibilityContext<'_>) -> bool + Send + 'static,
    ) -> bool {
        self.send(TriggerSignal::StartIfEligible(Box::new(predicate)))
    }

    pub fn request_welcome(&self) -> bool {
        self.send(TriggerSignal::RequestWelcome)
    }

    pub fn restart(&self) -> bool {
        self.send(TriggerSignal::Restart)
    }
}

/// Optional pre-tour decision screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WelcomeGate {
    visible: bool,
}

impl WelcomeGate {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `false` if it was already open.
    pub(crate) fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.visible, true)
    }

    /// Returns `false` if it was already closed.
    pub(crate) fn close(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}
