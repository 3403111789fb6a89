//! # Step Registry
//!
//! Lookup table from [`StepId`] to its [`StepDefinition`]. Stateless and
//! statically backed, so it is free to copy into every request.

use crate::steps::{ContactDetailsStep, PersonalDetailsStep, ReviewStep, StepDefinition};
use crate::{Record, StepId, WizardError};

static PERSONAL_DETAILS: PersonalDetailsStep = PersonalDetailsStep;
static CONTACT_DETAILS: ContactDetailsStep = ContactDetailsStep;
static REVIEW: ReviewStep = ReviewStep;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepRegistry;

impl StepRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The definition registered for a step.
    #[must_use]
    pub fn resolve(&self, step: StepId) -> &'static dyn StepDefinition {
        match step {
            StepId::PersonalDetails => &PERSONAL_DETAILS,
            StepId::ContactDetails => &CONTACT_DETAILS,
            StepId::Review => &REVIEW,
        }
    }

    /// Resolve a raw step key as stored in session state.
    ///
    /// Fails with `WizardError::UnknownStep` for keys outside the step set.
    pub fn resolve_key(&self, key: &str) -> Result<&'static dyn StepDefinition, WizardError> {
        let step: StepId = key.parse()?;
        Ok(self.resolve(step))
    }

    /// The first step of the chain (the one with no previous step).
    #[must_use]
    pub fn first(&self) -> StepId {
        StepId::ALL
            .into_iter()
            .find(|step| self.resolve(*step).previous_step().is_none())
            .unwrap_or(StepId::PersonalDetails)
    }

    /// The last step of the chain (the one with no next step).
    #[must_use]
    pub fn last(&self) -> StepId {
        StepId::ALL
            .into_iter()
            .find(|step| self.resolve(*step).next_step().is_none())
            .unwrap_or(StepId::Review)
    }

    /// The step a wizard enters on for the given record.
    ///
    /// Saved records are being edited and open on the last step (review);
    /// drafts start at the beginning of the chain.
    #[must_use]
    pub fn entry_for(&self, record: &Record) -> StepId {
        if record.is_saved() {
            self.last()
        } else {
            self.first()
        }
    }
}
