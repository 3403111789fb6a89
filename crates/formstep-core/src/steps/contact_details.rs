//! Contact details step: address and telephone.

use super::{
    FieldDef, StepContent, StepDefinition, commit_fields, populate_fields, validate_required,
};
use crate::types::{FieldError, FieldKind, Record, StepId, Submission};

pub const ADDRESS: &str = "field_address";
pub const TELEPHONE: &str = "field_telephone";

pub(crate) const FIELDS: &[FieldDef] = &[
    FieldDef {
        name: ADDRESS,
        label: "Address",
        kind: FieldKind::Text,
        required_message: "Please enter your address",
    },
    FieldDef {
        name: TELEPHONE,
        label: "Telephone",
        kind: FieldKind::Tel,
        required_message: "Please enter your telephone number",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactDetailsStep;

impl StepDefinition for ContactDetailsStep {
    fn id(&self) -> StepId {
        StepId::ContactDetails
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
        Some(StepId::Review)
    }

    fn previous_step(&self) -> Option<StepId> {
        Some(StepId::PersonalDetails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_telephone_fails_validation() {
        let mut values = Submission::new();
        values.insert(ADDRESS.to_string(), "1 Main St".to_string());
        values.insert(TELEPHONE.to_string(), "  ".to_string());

        let errors = ContactDetailsStep.validate_step(&values);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, TELEPHONE);
        assert_eq!(errors[0].message, "Please enter your telephone number");
    }

    #[test]
    fn telephone_renders_as_tel() {
        let content = ContactDetailsStep.populate_surface(&Record::draft("application"));
        assert_eq!(content.fields[1].kind, FieldKind::Tel);
    }
}
