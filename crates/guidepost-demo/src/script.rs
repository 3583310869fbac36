#![forbid(unsafe_code)]

//! The scripted walkthrough.
//!
//! Plays the part of a user who reads every tooltip, presses "Next" on free
//! steps and clicks the highlighted element on gated ones. Time only moves
//! when the script ticks the controller, so a run is fully deterministic.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use guidepost_runtime::{
    FlagRegistry, ProgressNotice, ProgressReporter, RecordingReporter, StorageError,
};
use guidepost_tour::{
    CatalogError, CompletionRecord, FlagKeys, MemoryHost, PersistenceBridge, StepCatalog,
    TerminalReason, TourConfig, TourController, TourError, TourEvent, TourOverlay, TourState,
    TriggerBus, default_eligibility,
};
use serde_json::{Value, json};

use crate::cli::Opts;

#[derive(Debug)]
pub enum DemoError {
    Catalog(CatalogError),
    Storage(StorageError),
    Tour(TourError),
    Io(io::Error),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::Catalog(e) => write!(f, "{e}"),
            DemoError::Storage(e) => write!(f, "flag store: {e}"),
            DemoError::Tour(e) => write!(f, "walkthrough: {e}"),
            DemoError::Io(e) => write!(f, "output: {e}"),
        }
    }
}

impl std::error::Error for DemoError {}

impl From<CatalogError> for DemoError {
    fn from(e: CatalogError) -> Self {
        DemoError::Catalog(e)
    }
}

impl From<StorageError> for DemoError {
    fn from(e: StorageError) -> Self {
        DemoError::Storage(e)
    }
}

impl From<TourError> for DemoError {
    fn from(e: TourError) -> Self {
        DemoError::Tour(e)
    }
}

impl From<io::Error> for DemoError {
    fn from(e: io::Error) -> Self {
        DemoError::Io(e)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Overlays printed (a step shown twice counts twice).
    pub steps_shown: usize,
    /// `None` when the user was not eligible or declined.
    pub outcome: Option<TerminalReason>,
    pub record: CompletionRecord,
    /// Remote notices, when the in-process recorder was used.
    pub notices: Vec<ProgressNotice>,
}

/// Run the walkthrough described by `opts`, writing JSON lines to `out`.
pub fn run(opts: &Opts, out: &mut dyn Write) -> Result<RunSummary, DemoError> {
    let config = TourConfig::from_env();

    let catalog = match &opts.catalog {
        Some(path) => StepCatalog::from_path(path)?,
        None => StepCatalog::dashboard(),
    };

    let flags = match &opts.state {
        Some(path) => FlagRegistry::with_file(path),
        None => FlagRegistry::in_memory(),
    }
    .shared();
    if opts.reset {
        flags.clear()?;
    }
    if let Err(e) = flags.load() {
        tracing::warn!(error = %e, "starting with empty walkthrough flags");
    }
    let keys = FlagKeys::default();
    // The demo user has always finished onboarding.
    flags.set(keys.onboarding_completed.clone(), true);

    let recorder = Arc::new(RecordingReporter::new());
    let reporter =
        remote_reporter(opts).unwrap_or_else(|| recorder.clone() as Arc<dyn ProgressReporter>);
    let bridge = PersistenceBridge::new(flags.clone(), reporter, keys);

    let mut host = MemoryHost::dashboard(opts.viewport);
    let mut tour = TourController::new(config, catalog, bridge)?;
    let bus = TriggerBus::new();

    emit(out, json!({ "event": "boot", "viewport": size_json(opts), "steps": tour.catalog().len() }))?;

    bus.sender().start_if_eligible(default_eligibility);
    let events = tour.pump(&mut host, &bus);
    for event in &events {
        emit(out, event_json(event))?;
    }
    if !tour.is_active() {
        if !tour.welcome_visible() {
            emit(out, json!({ "event": "not_eligible", "record": record_json(&tour) }))?;
            return Ok(summary(&tour, 0, None, &recorder));
        }
        if opts.decline {
            let event = tour.decline_welcome(&mut host)?;
            emit(out, event_json(&event))?;
            return Ok(summary(&tour, 0, None, &recorder));
        }
        let event = tour.accept_welcome(&mut host)?;
        emit(out, event_json(&event))?;
    }

    let navigation_settle = tour.config().navigation_settle;
    let scroll_settle = tour.config().scroll_settle;
    let max_moves = tour.catalog().len() * 4;
    let mut steps_shown = 0;

    for _ in 0..max_moves {
        if !tour.is_active() {
            break;
        }
        for event in tour.tick(&mut host, scroll_settle) {
            emit(out, event_json(&event))?;
        }
        if let Some(overlay) = tour.overlay() {
            steps_shown += 1;
            emit(out, overlay_json(&overlay))?;
        }

        let event = match tour.state() {
            TourState::ActiveWaiting => {
                let selector = current_selector(&tour);
                let clicked: Vec<_> = host
                    .listeners_for(&selector)
                    .into_iter()
                    .filter_map(|listener| tour.element_interacted(&mut host, listener))
                    .collect();
                if clicked.is_empty() {
                    // Nothing to click: the gated target never rendered.
                    emit(out, json!({ "event": "gated_target_missing", "selector": selector }))?;
                    tour.skip(&mut host)?
                } else {
                    for event in &clicked {
                        emit(out, event_json(event))?;
                    }
                    for event in tour.tick(&mut host, navigation_settle) {
                        emit(out, event_json(&event))?;
                    }
                    continue;
                }
            }
            TourState::ActiveFree => tour.advance(&mut host)?,
            TourState::Inactive | TourState::Terminal(_) => break,
        };
        emit(out, event_json(&event))?;
    }

    if tour.is_active() {
        let event = tour.skip(&mut host)?;
        emit(out, event_json(&event))?;
    }

    let outcome = tour.session().and_then(|s| s.terminal_reason());
    emit(
        out,
        json!({
            "event": "summary",
            "outcome": outcome.map(TerminalReason::as_str),
            "steps_shown": steps_shown,
            "navigations": host.navigations(),
            "record": record_json(&tour),
            "notices": recorder.notices().iter().map(|n| n.event.as_str()).collect::<Vec<_>>(),
        }),
    )?;
    Ok(summary(&tour, steps_shown, outcome, &recorder))
}

#[cfg(feature = "remote-progress")]
fn remote_reporter(opts: &Opts) -> Option<Arc<dyn ProgressReporter>> {
    let url = opts.progress_url.as_ref()?;
    match guidepost_runtime::HttpReporter::new(url, guidepost_runtime::HttpReporter::DEFAULT_TIMEOUT)
    {
        Ok(reporter) => Some(Arc::new(reporter)),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "falling back to in-process progress recorder");
            None
        }
    }
}

#[cfg(not(feature = "remote-progress"))]
fn remote_reporter(opts: &Opts) -> Option<Arc<dyn ProgressReporter>> {
    if let Some(url) = &opts.progress_url {
        tracing::warn!(url = %url, "--progress-url needs the remote-progress feature; ignoring");
    }
    None
}

fn current_selector(tour: &TourController) -> String {
    tour.session()
        .map(|s| s.current_step().target_selector.clone())
        .unwrap_or_default()
}

fn summary(
    tour: &TourController,
    steps_shown: usize,
    outcome: Option<TerminalReason>,
    recorder: &RecordingReporter,
) -> RunSummary {
    RunSummary {
        steps_shown,
        outcome,
        record: tour.persistence().completion_record(),
        notices: recorder.notices(),
    }
}

fn emit(out: &mut dyn Write, value: Value) -> io::Result<()> {
    writeln!(out, "{value}")
}

fn size_json(opts: &Opts) -> Value {
    json!({ "width": opts.viewport.width, "height": opts.viewport.height })
}

fn record_json(tour: &TourController) -> Value {
    let record = tour.persistence().completion_record();
    let keys: &FlagKeys = tour.persistence().keys();
    json!({
        "completed": record.completed,
        "skipped": record.skipped,
        "timestamp_ms": record.timestamp_ms,
        "welcome_shown": tour.persistence().flags().get(&keys.welcome_shown),
    })
}

fn event_json(event: &TourEvent) -> Value {
    match *event {
        TourEvent::Activated { session, index } => {
            json!({ "event": event.name(), "session": session.to_string(), "index": index })
        }
        TourEvent::StepChanged { from, to, reason } => {
            json!({ "event": event.name(), "from": from, "to": to, "reason": reason.as_str() })
        }
        TourEvent::InteractionAccepted { index, navigated } => {
            json!({ "event": event.name(), "index": index, "navigated": navigated })
        }
        TourEvent::Deactivated { reason, index } => {
            json!({ "event": event.name(), "reason": reason.as_str(), "index": index })
        }
        TourEvent::WelcomeShown | TourEvent::WelcomeClosed => json!({ "event": event.name() }),
    }
}

fn overlay_json(overlay: &TourOverlay<'_>) -> Value {
    json!({
        "event": "overlay",
        "index": overlay.step_index,
        "progress": overlay.progress_label(),
        "step": overlay.step.id,
        "title": overlay.step.title,
        "category": overlay.step.category.as_str(),
        "side": overlay.side.as_str(),
        "phase": overlay.phase.as_str(),
        "gated": overlay.gated,
        "tooltip": { "x": overlay.tooltip.x, "y": overlay.tooltip.y, "clamped": overlay.tooltip.clamped },
        "spotlight": overlay.spotlight.map(|r| json!([r.x, r.y, r.width, r.height])),
        "next": overlay.next_label(),
    })
}
