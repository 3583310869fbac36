#![forbid(unsafe_code)]

//! The immutable, ordered step catalog.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use guidepost_layout::Side;

use crate::step::{StepCategory, TourStep};

/// Errors building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// A catalog must hold at least one step.
    Empty,
    /// The JSON did not match the step contract.
    Parse(String),
    /// The catalog file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "step catalog is empty"),
            CatalogError::Parse(msg) => write!(f, "invalid step catalog: {msg}"),
            CatalogError::Io(e) => write!(f, "failed to read step catalog: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

/// Ordered, non-empty list of steps. Cloning shares the underlying slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    steps: Arc<[TourStep]>,
}

impl StepCatalog {
    pub fn new(steps: Vec<TourStep>) -> Result<Self, CatalogError> {
        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            steps: steps.into(),
        })
    }

    /// Parse a JSON array of steps.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let steps: Vec<TourStep> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(steps)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&*self.steps).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&TourStep> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TourStep> {
        self.steps.iter()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Walkthrough of the goal/task dashboard.
    pub fn dashboard() -> Self {
        Self {
            steps: dashboard_steps().into(),
        }
    }
}

impl std::ops::Index<usize> for StepCatalog {
    type Output = TourStep;

    fn index(&self, index: usize) -> &TourStep {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a StepCatalog {
    type Item = &'a TourStep;
    type IntoIter = std::slice::Iter<'a, TourStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

fn dashboard_steps() -> Vec<TourStep> {
    vec![
        TourStep::new("sidebar", "Your workspace", "#sidebar")
            .description("Everything lives in the sidebar: goals, tasks, calendar and settings.")
            .side(Side::Right)
            .category(StepCategory::Navigation),
        TourStep::new("dashboard-summary", "Progress at a glance", "#dashboard-summary")
            .description("Objective progress and this week's due tasks are summarised here.")
            .side(Side::Bottom),
        TourStep::new("open-goals", "Open your goals", "#nav-goals")
            .description("Click Goals to see your objectives and key results.")
            .side(Side::Right)
            .category(StepCategory::Action)
            .route("/goals")
            .interactive(),
        TourStep::new("goal-list", "Objectives and key results", "#goal-list")
            .description("Each objective rolls up the progress of its key results.")
            .side(Side::Top),
        TourStep::new("new-goal", "Create a goal", "#new-goal-button")
            .description("Start a new objective with measurable key results.")
            .side(Side::Left)
            .category(StepCategory::Action),
        TourStep::new("open-tasks", "Open your tasks", "#nav-tasks")
            .description("Click Tasks to plan the work behind each key result.")
            .side(Side::Right)
            .category(StepCategory::Action)
            .route("/tasks")
            .interactive(),
        TourStep::new("task-board", "Kanban board", "#task-board")
            .description("Drag tasks between columns as work moves along.")
            .side(Side::Top),
        TourStep::new("calendar", "Calendar", "#nav-calendar")
            .description("Deadlines and check-ins on a monthly calendar.")
            .side(Side::Right)
            .category(StepCategory::Navigation),
        TourStep::new("help-menu", "Replay anytime", "#help-menu")
            .description("Open the help menu to take this tour again.")
            .side(Side::Bottom)
            .category(StepCategory::Navigation),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(StepCatalog::new(vec![]), Err(CatalogError::Empty)));
        assert!(matches!(StepCatalog::from_json("[]"), Err(CatalogError::Empty)));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = StepCatalog::from_json(r#"[{"id":1}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().starts_with("invalid step catalog"));
    }

    #[test]
    fn dashboard_catalog_shape() {
        let catalog = StepCatalog::dashboard();
        assert!(catalog.len() >= 5);
        assert_eq!(catalog.position("open-goals"), Some(2));
        let gated: Vec<_> = catalog
            .iter()
            .filter(|s| s.requires_interaction)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(gated, vec!["open-goals", "open-tasks"]);
        assert!(catalog.iter().filter(|s| s.requires_interaction).all(|s| s.target_route.is_some()));
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let catalog = StepCatalog::dashboard();
        let parsed = StepCatalog::from_json(&catalog.to_json()).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn from_path_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("steps.json");
        std::fs::write(
            &path,
            r##"[{"id":"a","title":"A","targetSelector":"#a","preferredSide":"left"}]"##,
        )
        .unwrap();
        let catalog = StepCatalog::from_path(&path).unwrap();
        assert_eq!(catalog[0].preferred_side, Side::Left);
        assert!(matches!(
            StepCatalog::from_path(tmp.path().join("missing.json")),
            Err(CatalogError::Io(_))
        ));
    }

    #[test]
    fn clones_share_steps() {
        let a = StepCatalog::dashboard();
        let b = a.clone();
        assert!(std::ptr::eq(a.steps().as_ptr(), b.steps().as_ptr()));
    }
}
