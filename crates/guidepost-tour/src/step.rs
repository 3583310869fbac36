#![forbid(unsafe_code)]

//! Step descriptors.

use guidepost_layout::Side;
use serde::{Deserialize, Serialize};

/// Broad kind of a step, used by hosts to style the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepCategory {
    Navigation,
    #[default]
    Feature,
    Action,
}

impl StepCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            StepCategory::Navigation => "navigation",
            StepCategory::Feature => "feature",
            StepCategory::Action => "action",
        }
    }
}

/// One stop in the walkthrough.
///
/// The JSON shape is the durable content contract:
/// `{id, title, description, targetSelector, preferredSide, category,
/// targetRoute?, requiresInteraction?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Opaque locator string handed to the render tree.
    pub target_selector: String,
    #[serde(default)]
    pub preferred_side: Side,
    #[serde(default)]
    pub category: StepCategory,
    /// Route to navigate to once the step's interaction is performed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_route: Option<String>,
    /// The user must act on the target before the tour may advance.
    #[serde(default)]
    pub requires_interaction: bool,
}

impl TourStep {
    /// A plain feature step on the default (top) side.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        target_selector: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            target_selector: target_selector.into(),
            preferred_side: Side::default(),
            category: StepCategory::default(),
            target_route: None,
            requires_interaction: false,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.preferred_side = side;
        self
    }

    #[must_use]
    pub fn category(mut self, category: StepCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.target_route = Some(route.into());
        self
    }

    /// Require the user to act on the target before advancing.
    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.requires_interaction = true;
        self
    }
}
