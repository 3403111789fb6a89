//! Personal details step: first name, last name, birthdate.

use super::{
    FieldDef, StepContent, StepDefinition, commit_fields, populate_fields, validate_required,
};
use crate::types::{FieldError, FieldKind, Record, StepId, Submission};

pub const FIRST_NAME: &str = "field_first_name";
pub const LAST_NAME: &str = "field_last_name";
pub const BIRTHDATE: &str = "field_birthdate";

pub(crate) const FIELDS: &[FieldDef] = &[
    FieldDef {
        name: FIRST_NAME,
        label: "First Name",
        kind: FieldKind::Text,
        required_message: "Please enter your first name",
    },
    FieldDef {
        name: LAST_NAME,
        label: "Last Name",
        kind: FieldKind::Text,
        required_message: "Please enter your last name",
    },
    FieldDef {
        name: BIRTHDATE,
        label: "Birthdate",
        kind: FieldKind::Date,
        required_message: "Please enter your birthdate",
    },
];

/// First step of the wizard.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalDetailsStep;

impl StepDefinition for PersonalDetailsStep {
    fn id(&self) -> StepId {
        StepId::PersonalDetails
    }

    fn populate_surface(&self, record: &Record) -> StepContent {
        StepContent {
            fields: populate_fields(FIELDS, record),
            sections: Vec::new(),
        }
    }

    fn validate_step(&self, submission: &Submission) -> Vec<FieldError> {
        validate_required(FIELDS, submission)
    }

    fn commit_step(&self, submission: &Submission, record: &mut Record) {
        commit_fields(FIELDS, submission, record);
    }

    fn next_step(&self) -> Option<StepId> {
        Some(StepId::ContactDetails)
    }

    fn previous_step(&self) -> Option<StepId> {
        None
    }
}
