#![forbid(unsafe_code)]

//! Exclusive ownership of the walkthrough session.
//!
//! A [`SessionSlot`] admits one live [`TourController`] at a time. The
//! controller holds a [`SessionClaim`] for its whole lifetime and the claim
//! releases the slot on drop, so a second controller over the same slot is
//! refused until the first one is gone.
//!
//! [`SessionSlot::process`] is the slot every [`TourController::new`] call
//! competes for. Hosts that embed several independent engines (one per
//! window, one per test) give each its own slot through
//! [`TourController::with_slot`].
//!
//! [`TourController`]: crate::TourController
//! [`TourController::new`]: crate::TourController::new
//! [`TourController::with_slot`]: crate::TourController::with_slot

use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

static PROCESS_SLOT: OnceLock<SessionSlot> = OnceLock::new();

/// Admission point for one walkthrough controller.
#[derive(Clone, Default)]
pub struct SessionSlot {
    taken: Arc<AtomicBool>,
}

impl SessionSlot {
    /// A private slot, independent of every other slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide slot.
    pub fn process() -> &'static SessionSlot {
        PROCESS_SLOT.get_or_init(SessionSlot::new)
    }

    /// Take the slot. Fails while another claim is alive.
    pub fn claim(&self) -> Option<SessionClaim> {
        self.taken
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionClaim {
                taken: Arc::clone(&self.taken),
            })
    }

    pub fn is_claimed(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSlot")
            .field("claimed", &self.is_claimed())
            .finish()
    }
}

/// Proof that the holder owns a slot. Releases it on drop.
pub struct SessionClaim {
    taken: Arc<AtomicBool>,
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        self.taken.store(false, Ordering::Release);
    }
}

impl fmt::Debug for SessionClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionClaim")
    }
}
