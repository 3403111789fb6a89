//! Surface types: the data handed to rendering.

use super::{RecordId, StepId};
use serde::{Deserialize, Serialize};

/// Input widget a field is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Tel,
    /// ISO `YYYY-MM-DD`.
    Date,
}

/// One editable field with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Current record value; empty when the record has none.
    pub value: String,
}

/// A validation failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A read-only label/value line on the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub label: String,
    pub value: String,
}

/// A button that sets the current step directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepJump {
    pub label: String,
    pub target: StepId,
}

/// A titled group of display items with its edit button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSection {
    pub key: String,
    pub title: String,
    pub items: Vec<DisplayItem>,
    pub jump: StepJump,
}

/// Visibility of the navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    /// Disabled on the first step.
    pub previous_enabled: bool,
    /// Hidden on the review step.
    pub next_visible: bool,
    /// Shown on the review step only.
    pub submit_visible: bool,
}

impl Navigation {
    /// Button state for a step, derived from its chain position.
    #[must_use]
    pub fn for_position(has_previous: bool, has_next: bool) -> Self {
        Self {
            previous_enabled: has_previous,
            next_visible: has_next,
            submit_visible: !has_next,
        }
    }
}

/// Everything rendering needs to draw the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSurface {
    pub step: StepId,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub sections: Vec<ReviewSection>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    pub navigation: Navigation,
}

impl WizardSurface {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The error attached to a field, if any.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub record_id: RecordId,
    pub message: String,
    pub edit_link: String,
}

/// What a navigation event produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Surface(WizardSurface),
    Submitted(SubmissionResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_first_step() {
        let nav = Navigation::for_position(false, true);
        assert!(!nav.previous_enabled);
        assert!(nav.next_visible);
        assert!(!nav.submit_visible);
    }

    #[test]
    fn navigation_last_step_shows_submit() {
        let nav = Navigation::for_position(true, false);
        assert!(nav.previous_enabled);
        assert!(!nav.next_visible);
        assert!(nav.submit_visible);
    }
}
