#![forbid(unsafe_code)]

//! In-memory host: a scripted render tree, router and observer log.
//!
//! Pages are keyed by route. Elements registered under [`GLOBAL_ROUTE`]
//! (sidebar, header) are mounted on every page. Element rects are stored in
//! document coordinates; [`RenderTree::bounding_rect`] subtracts the current
//! scroll offset, so scrolling moves targets exactly like a browser would.
//!
//! Navigation and [`MemoryHost::rerender`] hand out fresh element handles,
//! mimicking a framework that replaces DOM nodes between renders.

use std::collections::{BTreeMap, HashMap};

use guidepost_core::geometry::{Point, Rect, Size};
use guidepost_layout::center_offset;

use super::{ElementHandle, ListenerId, NavigationError, RenderTree, Router, TourObserver};
use crate::session::TerminalReason;
use crate::step::TourStep;

/// Route whose elements are mounted on every page.
pub const GLOBAL_ROUTE: &str = "*";

/// Observer callbacks and side effects, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Activated,
    StepChanged { index: usize, step_id: String },
    Deactivated(TerminalReason),
    Welcome(bool),
    Navigated(String),
    NavigationRejected(String),
    Scrolled { selector: String, offset: Point },
    ListenerAttached { listener: ListenerId, selector: String },
    ListenerDetached(ListenerId),
}

#[derive(Debug, Clone)]
struct MemoryElement {
    selector: String,
    rect: Rect,
}

#[derive(Debug)]
pub struct MemoryHost {
    viewport: Size,
    route: String,
    pages: BTreeMap<String, Vec<MemoryElement>>,
    mounted: HashMap<ElementHandle, String>,
    scroll: Point,
    listeners: BTreeMap<ListenerId, ElementHandle>,
    next_handle: u64,
    reject_navigation: Option<String>,
    events: Vec<HostEvent>,
}

impl MemoryHost {
    pub fn new(viewport: Size, route: impl Into<String>) -> Self {
        let mut host = Self {
            viewport,
            route: route.into(),
            pages: BTreeMap::new(),
            mounted: HashMap::new(),
            scroll: Point::default(),
            listeners: BTreeMap::new(),
            next_handle: 1,
            reject_navigation: None,
            events: Vec::new(),
        };
        host.rerender();
        host
    }

    /// The goal/task dashboard laid out for [`StepCatalog::dashboard`].
    ///
    /// The kanban board sits below the fold so reaching it exercises scrolling.
    ///
    /// [`StepCatalog::dashboard`]: crate::StepCatalog::dashboard
    pub fn dashboard(viewport: Size) -> Self {
        let w = viewport.width;
        let h = viewport.height;
        let content = (w - 304.0).max(200.0);
        let mut host = Self::new(viewport, "/");
        host.add_element(GLOBAL_ROUTE, "#sidebar", Rect::new(0.0, 0.0, 240.0, h));
        host.add_element(GLOBAL_ROUTE, "#nav-goals", Rect::new(16.0, 200.0, 208.0, 40.0));
        host.add_element(GLOBAL_ROUTE, "#nav-tasks", Rect::new(16.0, 248.0, 208.0, 40.0));
        host.add_element(GLOBAL_ROUTE, "#nav-calendar", Rect::new(16.0, 296.0, 208.0, 40.0));
        host.add_element(GLOBAL_ROUTE, "#help-menu", Rect::new(w - 56.0, 8.0, 40.0, 40.0));
        host.add_element("/", "#dashboard-summary", Rect::new(272.0, 80.0, content, 220.0));
        host.add_element("/goals", "#goal-list", Rect::new(272.0, 140.0, content, 480.0));
        host.add_element("/goals", "#new-goal-button", Rect::new(w - 200.0, 80.0, 160.0, 40.0));
        host.add_element("/tasks", "#task-board", Rect::new(272.0, h + 300.0, content, 600.0));
        host.add_page("/calendar");
        host
    }

    /// Register a route with no page-specific elements.
    pub fn add_page(&mut self, route: impl Into<String>) {
        self.pages.entry(route.into()).or_default();
    }

    /// Add an element (document coordinates) to a route.
    pub fn add_element(&mut self, route: &str, selector: impl Into<String>, rect: Rect) {
        self.pages
            .entry(route.to_string())
            .or_default()
            .push(MemoryElement {
                selector: selector.into(),
                rect,
            });
        self.rerender();
    }

    /// Remove every element matching `selector` from a route.
    pub fn remove_element(&mut self, route: &str, selector: &str) {
        if let Some(elements) = self.pages.get_mut(route) {
            elements.retain(|e| e.selector != selector);
        }
        self.rerender();
    }

    /// Move an element to a new document rect.
    pub fn move_element(&mut self, selector: &str, rect: Rect) {
        for elements in self.pages.values_mut() {
            for element in elements.iter_mut().filter(|e| e.selector == selector) {
                element.rect = rect;
            }
        }
    }

    /// Replace every mounted element with a fresh handle.
    ///
    /// Listeners stay attached to the old handles, which no longer resolve.
    pub fn rerender(&mut self) {
        self.mounted.clear();
        let selectors: Vec<String> = self
            .visible_elements()
            .map(|e| e.selector.clone())
            .collect();
        for selector in selectors {
            let handle = ElementHandle(self.next_handle);
            self.next_handle += 1;
            self.mounted.insert(handle, selector);
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Make every subsequent `navigate` fail with `reason` (`None` to accept again).
    pub fn reject_navigation(&mut self, reason: Option<&str>) {
        self.reject_navigation = reason.map(str::to_string);
    }

    pub fn scroll_offset(&self) -> Point {
        self.scroll
    }

    /// Listeners currently attached to whatever `selector` resolves to.
    ///
    /// This is what a click on that element would trigger.
    pub fn listeners_for(&self, selector: &str) -> Vec<ListenerId> {
        let Some(handle) = self.locate(selector) else {
            return Vec::new();
        };
        self.listeners
            .iter()
            .filter(|(_, el)| **el == handle)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every route successfully navigated to, in order.
    pub fn navigations(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Navigated(route) => Some(route.as_str()),
                _ => None,
            })
            .collect()
    }

    fn visible_elements(&self) -> impl Iterator<Item = &MemoryElement> {
        let global = self.pages.get(GLOBAL_ROUTE).into_iter().flatten();
        let page = self.pages.get(&self.route).into_iter().flatten();
        global.chain(page)
    }

    fn document_rect(&self, selector: &str) -> Option<Rect> {
        self.visible_elements()
            .find(|e| e.selector == selector)
            .map(|e| e.rect)
    }
}

impl RenderTree for MemoryHost {
    fn locate(&self, selector: &str) -> Option<ElementHandle> {
        self.mounted
            .iter()
            .find(|(_, s)| s.as_str() == selector)
            .map(|(handle, _)| *handle)
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect> {
        let selector = self.mounted.get(&element)?;
        let rect = self.document_rect(selector)?;
        Some(Rect::new(
            rect.x - self.scroll.x,
            rect.y - self.scroll.y,
            rect.width,
            rect.height,
        ))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_into_view(&mut self, element: ElementHandle) {
        let Some(rect) = self.bounding_rect(element) else {
            return;
        };
        // The document only scrolls vertically.
        let delta = center_offset(&rect, self.viewport);
        self.scroll = Point::new(self.scroll.x, (self.scroll.y - delta.y).max(0.0));
        let selector = self.mounted.get(&element).cloned().unwrap_or_default();
        self.events.push(HostEvent::Scrolled {
            selector,
            offset: self.scroll,
        });
    }

    fn attach_listener(&mut self, element: ElementHandle, listener: ListenerId) {
        self.listeners.insert(listener, element);
        let selector = self.mounted.get(&element).cloned().unwrap_or_default();
        self.events
            .push(HostEvent::ListenerAttached { listener, selector });
    }

    fn detach_listener(&mut self, listener: ListenerId) {
        if self.listeners.remove(&listener).is_some() {
            self.events.push(HostEvent::ListenerDetached(listener));
        }
    }
}

impl Router for MemoryHost {
    fn current_route(&self) -> &str {
        &self.route
    }

    fn navigate(&mut self, path: &str) -> Result<(), NavigationError> {
        if let Some(reason) = &self.reject_navigation {
            self.events
                .push(HostEvent::NavigationRejected(path.to_string()));
            return Err(NavigationError::Rejected(reason.clone()));
        }
        if !self.pages.contains_key(path) {
            self.events
                .push(HostEvent::NavigationRejected(path.to_string()));
            return Err(NavigationError::UnknownRoute(path.to_string()));
        }
        self.route = path.to_string();
        self.scroll = Point::default();
        self.rerender();
        self.events.push(HostEvent::Navigated(path.to_string()));
        Ok(())
    }
}

impl TourObserver for MemoryHost {
    fn on_activate(&mut self) {
        self.events.push(HostEvent::Activated);
    }

    fn on_step_change(&mut self, index: usize, step: &TourStep) {
        self.events.push(HostEvent::StepChanged {
            index,
            step_id: step.id.clone(),
        });
    }

    fn on_deactivate(&mut self, reason: TerminalReason) {
        self.events.push(HostEvent::Deactivated(reason));
    }

    fn on_welcome(&mut self, visible: bool) {
        self.events.push(HostEvent::Welcome(visible));
    }
}
