#![forbid(unsafe_code)]

//! One-shot interaction gate.
//!
//! A gate holds at most one armed listener. Firing consumes the armed
//! payload and detaches the listener, so `on_satisfied` is handed out at
//! most once per [`InteractionGate::arm`]. A listener id that no longer
//! matches the armed one (already fired, disarmed, or from an older step)
//! is ignored.
//!
//! Arming while armed is refused; callers disarm the previous step's gate
//! first, so no two steps are ever gated at the same time.

use std::fmt;

use crate::host::{ElementHandle, ListenerId, RenderTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    AlreadyArmed { listener: ListenerId },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::AlreadyArmed { listener } => {
                write!(f, "gate already armed with {listener}")
            }
        }
    }
}

impl std::error::Error for GateError {}

#[derive(Debug)]
struct Armed<T> {
    listener: ListenerId,
    element: ElementHandle,
    on_satisfied: T,
}

#[derive(Debug)]
pub struct InteractionGate<T> {
    armed: Option<Armed<T>>,
    next_listener: u64,
}

impl<T> Default for InteractionGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InteractionGate<T> {
    pub fn new() -> Self {
        Self {
            armed: None,
            next_listener: 1,
        }
    }

    /// Attach a listener to `element` carrying `on_satisfied`.
    pub fn arm<R: RenderTree + ?Sized>(
        &mut self,
        tree: &mut R,
        element: ElementHandle,
        on_satisfied: T,
    ) -> Result<ListenerId, GateError> {
        if let Some(armed) = &self.armed {
            return Err(GateError::AlreadyArmed {
                listener: armed.listener,
            });
        }
        let listener = ListenerId(self.next_listener);
        self.next_listener += 1;
        tree.attach_listener(element, listener);
        self.armed = Some(Armed {
            listener,
            element,
            on_satisfied,
        });
        tracing::debug!(%listener, element = element.0, "gate armed");
        Ok(listener)
    }

    /// Detach the live listener, if any, and drop its payload back to the caller.
    pub fn disarm<R: RenderTree + ?Sized>(&mut self, tree: &mut R) -> Option<T> {
        let armed = self.armed.take()?;
        tree.detach_listener(armed.listener);
        tracing::debug!(listener = %armed.listener, "gate disarmed");
        Some(armed.on_satisfied)
    }

    /// Report that `listener` fired. Returns the payload the first time only.
    pub fn fire<R: RenderTree + ?Sized>(&mut self, tree: &mut R, listener: ListenerId) -> Option<T> {
        match &self.armed {
            Some(armed) if armed.listener == listener => {}
            _ => {
                tracing::debug!(%listener, "stale gate fire ignored");
                return None;
            }
        }
        let armed = self.armed.take()?;
        tree.detach_listener(armed.listener);
        Some(armed.on_satisfied)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_listener(&self) -> Option<ListenerId> {
        self.armed.as_ref().map(|a| a.listener)
    }

    pub fn armed_element(&self) -> Option<ElementHandle> {
        self.armed.as_ref().map(|a| a.element)
    }

    pub fn armed_payload(&self) -> Option<&T> {
        self.armed.as_ref().map(|a| &a.on_satisfied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use guidepost_core::geometry::Size;

    fn host() -> MemoryHost {
        MemoryHost::dashboard(Size::new(1280.0, 800.0))
    }

    #[test]
    fn fires_at_most_once_under_rapid_clicks() {
        let mut host = host();
        let mut gate = InteractionGate::new();
        let el = host.locate("#nav-goals").unwrap();
        let listener = gate.arm(&mut host, el, "advance").unwrap();

        let mut satisfied = 0;
        for _ in 0..10 {
            if gate.fire(&mut host, listener).is_some() {
                satisfied += 1;
            }
        }
        assert_eq!(satisfied, 1);
        assert!(!gate.is_armed());
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn disarm_prevents_stale_callback() {
        let mut host = host();
        let mut gate = InteractionGate::new();
        let el = host.locate("#nav-goals").unwrap();
        let stale = gate.arm(&mut host, el, 1).unwrap();
        assert_eq!(gate.disarm(&mut host), Some(1));

        let el = host.locate("#nav-tasks").unwrap();
        let fresh = gate.arm(&mut host, el, 2).unwrap();
        assert_ne!(stale, fresh);
        assert_eq!(gate.fire(&mut host, stale), None);
        assert_eq!(gate.fire(&mut host, fresh), Some(2));
    }

    #[test]
    fn refuses_double_arm() {
        let mut host = host();
        let mut gate = InteractionGate::new();
        let el = host.locate("#nav-goals").unwrap();
        let first = gate.arm(&mut host, el, ()).unwrap();
        let err = gate.arm(&mut host, el, ()).unwrap_err();
        assert_eq!(err, GateError::AlreadyArmed { listener: first });
        assert_eq!(host.listener_count(), 1);
        assert_eq!(gate.armed_element(), Some(el));
    }

    #[test]
    fn disarm_when_idle_is_noop() {
        let mut host = host();
        let mut gate: InteractionGate<()> = InteractionGate::new();
        assert!(gate.disarm(&mut host).is_none());
        assert!(gate.armed_listener().is_none());
    }
}
