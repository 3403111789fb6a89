//! # Wizard Steps
//!
//! Each step owns a subset of record fields and declares its neighbours in
//! the chain `personal_details ⇄ contact_details ⇄ review`.
//!
//! Editable steps describe their fields with a static [`FieldDef`] table and
//! share the population, validation and commit helpers in this module.

mod contact_details;
mod personal_details;
mod review;

pub use contact_details::{ADDRESS, ContactDetailsStep, TELEPHONE};
pub use personal_details::{BIRTHDATE, FIRST_NAME, LAST_NAME, PersonalDetailsStep};
pub use review::ReviewStep;

use crate::types::{FieldError, FieldKind, FieldSpec, Record, ReviewSection, StepId, Submission};

/// What a step contributes to the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepContent {
    pub fields: Vec<FieldSpec>,
    pub sections: Vec<ReviewSection>,
}

/// The capability set every wizard step provides.
pub trait StepDefinition: Send + Sync + std::fmt::Debug {
    fn id(&self) -> StepId;

    /// Build the step's fields (or review sections) from the record.
    ///
    /// Missing record fields are treated as unset and populate as empty.
    fn populate_surface(&self, record: &Record) -> StepContent;

    /// Check submitted values. An empty result means the step is valid.
    fn validate_step(&self, submission: &Submission) -> Vec<FieldError>;

    /// Write submitted values for the owned fields onto the record.
    fn commit_step(&self, submission: &Submission, record: &mut Record);

    /// `None` on the last step.
    fn next_step(&self) -> Option<StepId>;

    /// `None` on the first step.
    fn previous_step(&self) -> Option<StepId>;

    /// Steps this step may jump to directly, without commit or validation.
    fn jumps(&self) -> &'static [StepId] {
        &[]
    }
}

// =============================================================================
// SHARED FIELD HELPERS
// =============================================================================

/// Static description of one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Message shown when the field is submitted empty.
    pub required_message: &'static str,
}

/// Populate field specs from the record, defaulting absent values to empty.
pub(crate) fn populate_fields(defs: &[FieldDef], record: &Record) -> Vec<FieldSpec> {
    defs.iter()
        .map(|def| FieldSpec {
            name: def.name.to_string(),
            label: def.label.to_string(),
            kind: def.kind,
            required: true,
            value: record.get(def.name).unwrap_or_default().to_string(),
        })
        .collect()
}

/// A submitted value is empty when absent or blank after trimming.
pub(crate) fn field_is_empty(submission: &Submission, name: &str) -> bool {
    submission.get(name).is_none_or(|v| v.trim().is_empty())
}

/// One error per empty field, in table order.
pub(crate) fn validate_required(defs: &[FieldDef], submission: &Submission) -> Vec<FieldError> {
    defs.iter()
        .filter(|def| field_is_empty(submission, def.name))
        .map(|def| FieldError::new(def.name, def.required_message))
        .collect()
}

/// Copy submitted values onto the record.
///
/// Keys absent from the submission leave the record untouched; present keys
/// overwrite, including with an empty string.
pub(crate) fn commit_fields(defs: &[FieldDef], submission: &Submission, record: &mut Record) {
    for def in defs {
        if let Some(value) = submission.get(def.name) {
            record.set(def.name, value.clone());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
