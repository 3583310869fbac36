#![forbid(unsafe_code)]

//! End-to-end runs of the scripted demo.
//!
//! Run: `cargo test -p guidepost-demo --test demo_script`

use guidepost_demo::cli::Opts;
use guidepost_demo::script::{self, DemoError};
use guidepost_runtime::ProgressEvent;
use guidepost_tour::{StepCatalog, TerminalReason, TourStep};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

// A run owns the process-wide walkthrough slot; runs must not overlap.
static RUN_LOCK: Mutex<()> = Mutex::new(());

fn exclusive() -> MutexGuard<'static, ()> {
    RUN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn run(opts: &Opts) -> (script::RunSummary, Vec<Value>) {
    let mut out = Vec::new();
    let summary = script::run(opts, &mut out).expect("demo run");
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect();
    (summary, lines)
}

fn events(lines: &[Value]) -> Vec<&str> {
    lines.iter().filter_map(|v| v["event"].as_str()).collect()
}

#[test]
fn default_run_completes_the_dashboard_tour() {
    let _guard = exclusive();
    let (summary, lines) = run(&Opts::default());

    assert_eq!(summary.outcome, Some(TerminalReason::Completed));
    assert_eq!(summary.steps_shown, StepCatalog::dashboard().len());
    assert!(summary.record.completed);
    assert_eq!(
        summary.notices.iter().map(|n| n.event).collect::<Vec<_>>(),
        vec![ProgressEvent::Started, ProgressEvent::Completed]
    );

    let names = events(&lines);
    assert_eq!(names[0], "boot");
    assert_eq!(names[1], "welcome_shown");
    assert_eq!(names[2], "activated");
    assert_eq!(names.iter().filter(|n| **n == "interaction_accepted").count(), 2);
    assert_eq!(names.last(), Some(&"summary"));

    // Every transition is printed exactly once, including settle advances.
    let changes: Vec<_> = lines.iter().filter(|v| v["event"] == "step_changed").collect();
    assert_eq!(changes.len(), StepCatalog::dashboard().len() - 1);
    assert_eq!(changes.iter().filter(|v| v["reason"] == "interaction").count(), 2);
    assert_eq!(names.iter().filter(|n| **n == "deactivated").count(), 1);

    let last = lines.last().unwrap();
    assert_eq!(last["outcome"], "completed");
    assert_eq!(last["navigations"], serde_json::json!(["/goals", "/tasks"]));

    // Every overlay keeps its tooltip inside the viewport margins.
    for overlay in lines.iter().filter(|v| v["event"] == "overlay") {
        let x = overlay["tooltip"]["x"].as_f64().unwrap();
        let y = overlay["tooltip"]["y"].as_f64().unwrap();
        assert!((12.0..=1280.0 - 320.0 - 12.0).contains(&x), "x = {x}");
        assert!((12.0..=800.0 - 180.0 - 12.0).contains(&y), "y = {y}");
        assert_eq!(overlay["phase"], "precise");
    }
}

#[test]
fn second_run_with_state_file_is_not_eligible() {
    let _guard = exclusive();
    let dir = tempfile::tempdir().unwrap();
    let opts = Opts {
        state: Some(dir.path().join("flags.json")),
        ..Opts::default()
    };

    let (first, _) = run(&opts);
    assert_eq!(first.outcome, Some(TerminalReason::Completed));

    let (second, lines) = run(&opts);
    assert_eq!(second.outcome, None);
    assert_eq!(second.steps_shown, 0);
    assert!(second.record.completed);
    assert_eq!(events(&lines), vec!["boot", "not_eligible"]);

    let reset = Opts {
        reset: true,
        ..opts
    };
    let (third, _) = run(&reset);
    assert_eq!(third.outcome, Some(TerminalReason::Completed));
}

#[test]
fn declining_the_welcome_records_a_skip() {
    let _guard = exclusive();
    let opts = Opts {
        decline: true,
        ..Opts::default()
    };
    let (summary, lines) = run(&opts);
    assert_eq!(summary.outcome, None);
    assert!(summary.record.skipped);
    assert!(summary.notices.is_empty());
    assert_eq!(events(&lines), vec!["boot", "welcome_shown", "welcome_closed"]);
}

#[test]
fn gated_step_with_missing_target_ends_in_skip() {
    let _guard = exclusive();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let catalog = StepCatalog::new(vec![
        TourStep::new("sidebar", "Sidebar", "#sidebar"),
        TourStep::new("ghost", "Ghost button", "#ghost").interactive(),
    ])
    .unwrap();
    std::fs::write(&path, catalog.to_json()).unwrap();

    let opts = Opts {
        catalog: Some(path),
        ..Opts::default()
    };
    let (summary, lines) = run(&opts);
    assert_eq!(summary.outcome, Some(TerminalReason::Skipped));
    assert_eq!(summary.steps_shown, 1);
    assert!(events(&lines).contains(&"gated_target_missing"));
}

#[test]
fn unreadable_catalog_is_an_error() {
    let _guard = exclusive();
    let opts = Opts {
        catalog: Some("/definitely/not/here.json".into()),
        ..Opts::default()
    };
    let mut out = Vec::new();
    let err = script::run(&opts, &mut out).unwrap_err();
    assert!(matches!(err, DemoError::Catalog(_)));
}

#[test]
fn run_refuses_to_start_beside_a_live_controller() {
    let _guard = exclusive();
    let live = guidepost_tour::TourController::new(
        guidepost_tour::TourConfig::default(),
        StepCatalog::dashboard(),
        guidepost_tour::PersistenceBridge::in_memory(),
    )
    .unwrap();

    let mut out = Vec::new();
    let err = script::run(&Opts::default(), &mut out).unwrap_err();
    assert!(matches!(
        err,
        DemoError::Tour(guidepost_tour::TourError::SessionTaken)
    ));

    drop(live);
    assert!(script::run(&Opts::default(), &mut out).is_ok());
}
