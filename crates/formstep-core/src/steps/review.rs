//! Review step: read-only summary of the other steps, with edit buttons.

use super::{FieldDef, StepContent, StepDefinition, contact_details, personal_details};
use crate::types::{
    DisplayItem, FieldError, Record, ReviewSection, StepId, StepJump, Submission,
};

const JUMPS: &[StepId] = &[StepId::PersonalDetails, StepId::ContactDetails];

/// Last step of the wizard. Owns no fields; submission happens from here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewStep;

fn section(
    key: &str,
    title: &str,
    defs: &[FieldDef],
    record: &Record,
    jump_label: &str,
    target: StepId,
) -> ReviewSection {
    ReviewSection {
        key: key.to_string(),
        title: title.to_string(),
        items: defs
            .iter()
            .map(|def| DisplayItem {
                label: def.label.to_string(),
                value: record.get(def.name).unwrap_or_default().to_string(),
            })
            .collect(),
        jump: StepJump {
            label: jump_label.to_string(),
            target,
        },
    }
}

impl StepDefinition for ReviewStep {
    fn id(&self) -> StepId {
        StepId::Review
    }

    fn populate_surface(&self, record: &Record) -> StepContent {
        StepContent {
            fields: Vec::new(),
            sections: vec![
                section(
                    "personal_details",
                    "Personal Details",
                    personal_details::FIELDS,
                    record,
                    "Edit personal details",
                    StepId::PersonalDetails,
                ),
                section(
                    "contact_details",
                    "Contact Details",
                    contact_details::FIELDS,
                    record,
                    "Edit contact details",
                    StepId::ContactDetails,
                ),
            ],
        }
    }

    fn validate_step(&self, _submission: &Submission) -> Vec<FieldError> {
        Vec::new()
    }

    fn commit_step(&self, _submission: &Submission, _record: &mut Record) {}

    fn next_step(&self) -> Option<StepId> {
        None
    }

    fn previous_step(&self) -> Option<StepId> {
        Some(StepId::ContactDetails)
    }

    fn jumps(&self) -> &'static [StepId] {
        JUMPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{ADDRESS, FIRST_NAME, TELEPHONE};

    fn filled_record() -> Record {
        let mut record = Record::draft("application");
        record.set(FIRST_NAME, "Jane");
        record.set(ADDRESS, "1 Main St");
        record.set(TELEPHONE, "555-0100");
        record
    }

    #[test]
    fn review_shows_address_value() {
        let content = ReviewStep.populate_surface(&filled_record());
        let contact = &content.sections[1];

        assert_eq!(contact.items[0].label, "Address");
        assert_eq!(contact.items[0].value, "1 Main St");
        assert_eq!(contact.items[1].value, "555-0100");
    }

    #[test]
    fn sections_carry_jump_targets() {
        let content = ReviewStep.populate_surface(&filled_record());
        let targets: Vec<_> = content.sections.iter().map(|s| s.jump.target).collect();
        assert_eq!(targets, JUMPS.to_vec());
        assert!(content.fields.is_empty());
    }

    #[test]
    fn review_is_always_valid_and_commits_nothing() {
        let mut values = Submission::new();
        values.insert(FIRST_NAME.to_string(), "Overwritten".to_string());
        let mut record = filled_record();

        assert!(ReviewStep.validate_step(&values).is_empty());
        ReviewStep.commit_step(&values, &mut record);
        assert_eq!(record.get(FIRST_NAME), Some("Jane"));
    }

    #[test]
    fn missing_fields_display_empty() {
        let content = ReviewStep.populate_surface(&Record::draft("application"));
        assert!(
            content
                .sections
                .iter()
                .flat_map(|s| &s.items)
                .all(|item| item.value.is_empty())
        );
    }
}
