#![forbid(unsafe_code)]

//! Capabilities the engine consumes from its host.
//!
//! The render tree, router and chrome all belong to the host application.
//! The engine reaches them only through these traits, which keeps the
//! state machine and placement math testable without a real UI.

pub mod memory;

use std::fmt;

use guidepost_core::geometry::{Rect, Size};

use crate::session::TerminalReason;
use crate::step::TourStep;

/// Opaque reference to an element in the host's render tree.
///
/// Only valid for the render that produced it; the engine re-resolves
/// selectors instead of holding on to handles across steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Identity of one interaction listener attached by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The live render tree: element lookup, geometry, scrolling and listeners.
pub trait RenderTree {
    /// Resolve a selector against the current render.
    fn locate(&self, selector: &str) -> Option<ElementHandle>;

    /// Viewport-relative bounds of an element, if it is still mounted.
    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect>;

    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Start scrolling the element into a centered view. May complete later.
    fn scroll_into_view(&mut self, element: ElementHandle);

    /// Attach a one-shot interaction listener. The host reports a firing by
    /// calling `TourController::element_interacted` with `listener`.
    fn attach_listener(&mut self, element: ElementHandle, listener: ListenerId);

    /// Remove a listener. Removing an unknown listener is a no-op.
    fn detach_listener(&mut self, listener: ListenerId);
}

/// Why the router refused a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    Rejected(String),
    UnknownRoute(String),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::Rejected(msg) => write!(f, "navigation rejected: {msg}"),
            NavigationError::UnknownRoute(route) => write!(f, "unknown route: {route}"),
        }
    }
}

impl std::error::Error for NavigationError {}

/// Host router. Navigation is best effort from the engine's point of view.
pub trait Router {
    fn current_route(&self) -> &str;

    fn navigate(&mut self, path: &str) -> Result<(), NavigationError>;
}

/// Outbound notifications so the host can drive its own chrome
/// (disable background scroll, show a progress pip, ...).
pub trait TourObserver {
    fn on_activate(&mut self) {}

    fn on_step_change(&mut self, _index: usize, _step: &TourStep) {}

    fn on_deactivate(&mut self, _reason: TerminalReason) {}

    /// The welcome gate opened (`true`) or closed (`false`).
    fn on_welcome(&mut self, _visible: bool) {}
}

/// Everything the controller needs from the host, as one bound.
pub trait TourHost: RenderTree + Router + TourObserver {}

impl<T: RenderTree + Router + TourObserver + ?Sized> TourHost for T {}
