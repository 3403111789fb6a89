//! # Wizard Controller
//!
//! Orchestrates one wizard session: picks the entry step, dispatches
//! navigation events to the active step definition and performs the single
//! durable save at submission.
//!
//! The controller holds no per-session data. Every call receives the
//! session's [`WizardSessionState`] explicitly and writes the new step back
//! into it; the caller persists that state in its session store.
//!
//! ## Navigation rules
//!
//! | Action | Validates | Commits | Moves to |
//! |--------|-----------|---------|----------|
//! | `Next` | yes | if valid | `next_step()` |
//! | `Previous` | no | yes | `previous_step()` (no-op on the first step) |
//! | `Jump(target)` | no | no | `target`, if declared by the step |
//! | `Submit` | no | no | clears the session after saving |

use crate::primitives::{MAX_TITLE_LENGTH, SUBMITTED_MESSAGE, edit_link};
use crate::registry::StepRegistry;
use crate::session::WizardSessionState;
use crate::steps::StepDefinition;
use crate::storage::RecordStore;
use crate::{
    Action, ActingUser, FieldError, Navigation, NavigationOutcome, Record, StepId, Submission,
    SubmissionResult, WizardError, WizardSurface,
};

/// Coordinates steps, session state and record storage.
#[derive(Debug, Clone, Default)]
pub struct WizardController {
    registry: StepRegistry,
    /// Prefix prepended to edit links (e.g. `https://apply.example.org`).
    link_base: String,
}

impl WizardController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix used when building edit links after submission.
    #[must_use]
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn registry(&self) -> StepRegistry {
        self.registry
    }

    // =========================================================================
    // START
    // =========================================================================

    /// Enter (or re-enter) the wizard.
    ///
    /// A record must always be supplied. If the session already holds one, the
    /// session's record wins so that reloads mid-wizard keep earlier edits.
    /// The step comes from the session when present, otherwise from the
    /// record: saved records open on review, drafts on the first step.
    pub fn start(
        &self,
        state: &mut WizardSessionState,
        record: Option<Record>,
    ) -> Result<WizardSurface, WizardError> {
        let supplied = record.ok_or(WizardError::MissingRecord)?;
        if state.record().is_none() {
            state.set_record(supplied);
        }

        let step = self.current_step(state)?;
        let record = state.record().ok_or(WizardError::MissingRecord)?;
        tracing::debug!(step = %step, saved = record.is_saved(), "Wizard started");

        Ok(self.build_surface(step, record, Vec::new()))
    }

    /// Resolve the session's current step, writing it back into state.
    ///
    /// A stored key outside the step set is reset to the record's entry step.
    pub fn current_step(&self, state: &mut WizardSessionState) -> Result<StepId, WizardError> {
        let derived = self
            .registry
            .entry_for(state.record().ok_or(WizardError::MissingRecord)?);
        let stored = state.step_key().map(str::to_owned);

        let step = match stored {
            None => derived,
            Some(key) => match self.registry.resolve_key(&key) {
                Ok(definition) => definition.id(),
                Err(err) => {
                    tracing::warn!(
                        stored = %key,
                        reset_to = %derived,
                        error = %err,
                        "Session holds an unknown step, resetting"
                    );
                    derived
                }
            },
        };

        state.set_step(step);
        Ok(step)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Apply one navigation event to the session.
    pub fn handle_navigation<S, U>(
        &self,
        state: &mut WizardSessionState,
        action: Action,
        submission: &Submission,
        store: &mut S,
        user: &U,
    ) -> Result<NavigationOutcome, WizardError>
    where
        S: RecordStore + ?Sized,
        U: ActingUser + ?Sized,
    {
        let step = self.current_step(state)?;
        let definition = self.registry.resolve(step);

        match action {
            Action::Next => {
                let next = definition
                    .next_step()
                    .ok_or(WizardError::InvalidAction { action, step })?;

                let errors = definition.validate_step(submission);
                if !errors.is_empty() {
                    tracing::debug!(step = %step, errors = errors.len(), "Step failed validation");
                    let record = state.record().ok_or(WizardError::MissingRecord)?;
                    let mut surface = self.build_surface(step, record, errors);
                    retain_submitted(&mut surface, submission);
                    return Ok(NavigationOutcome::Surface(surface));
                }

                commit(state, definition, submission)?;
                self.transition(state, step, next)
            }

            Action::Previous => match definition.previous_step() {
                Some(previous) => {
                    // Backward moves keep whatever was typed, valid or not.
                    commit(state, definition, submission)?;
                    self.transition(state, step, previous)
                }
                None => {
                    let record = state.record().ok_or(WizardError::MissingRecord)?;
                    Ok(NavigationOutcome::Surface(
                        self.build_surface(step, record, Vec::new()),
                    ))
                }
            },

            Action::Jump(target) => {
                if !definition.jumps().contains(&target) {
                    return Err(WizardError::InvalidAction { action, step });
                }
                self.transition(state, step, target)
            }

            Action::Submit => {
                if definition.next_step().is_some() {
                    return Err(WizardError::InvalidAction { action, step });
                }
                self.submit(state, store, user)
                    .map(NavigationOutcome::Submitted)
            }
        }
    }

    /// Move the session to `to` and build its surface.
    fn transition(
        &self,
        state: &mut WizardSessionState,
        from: StepId,
        to: StepId,
    ) -> Result<NavigationOutcome, WizardError> {
        state.set_step(to);
        tracing::debug!(from = %from, to = %to, "Step transition");

        let record = state.record().ok_or(WizardError::MissingRecord)?;
        Ok(NavigationOutcome::Surface(
            self.build_surface(to, record, Vec::new()),
        ))
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Persist the session's record and end the session.
    ///
    /// Works on a copy so that a failed save leaves the session intact.
    fn submit<S, U>(
        &self,
        state: &mut WizardSessionState,
        store: &mut S,
        user: &U,
    ) -> Result<SubmissionResult, WizardError>
    where
        S: RecordStore + ?Sized,
        U: ActingUser + ?Sized,
    {
        let mut record = state.record().cloned().ok_or(WizardError::MissingRecord)?;

        record.set_owner(user.user_id());
        if record.title().is_none_or(|t| t.trim().is_empty()) {
            record.set_title(default_title(user.display_name()));
        }

        let id = store.save(&record).inspect_err(|err| {
            tracing::error!(error = %err, "Saving the application failed; session kept");
        })?;
        record.assign_id(id)?;
        state.clear();

        tracing::info!(record_id = %id, owner = user.user_id().0, "Application submitted");

        Ok(SubmissionResult {
            record_id: id,
            message: SUBMITTED_MESSAGE.to_string(),
            edit_link: format!("{}{}", self.link_base, edit_link(id.0)),
        })
    }

    // =========================================================================
    // SURFACE
    // =========================================================================

    fn build_surface(&self, step: StepId, record: &Record, errors: Vec<FieldError>) -> WizardSurface {
        let definition = self.registry.resolve(step);
        let content = definition.populate_surface(record);

        WizardSurface {
            step,
            fields: content.fields,
            sections: content.sections,
            errors,
            navigation: Navigation::for_position(
                definition.previous_step().is_some(),
                definition.next_step().is_some(),
            ),
        }
    }
}

/// Commit the submission onto the session's record.
fn commit(
    state: &mut WizardSessionState,
    definition: &dyn StepDefinition,
    submission: &Submission,
) -> Result<(), WizardError> {
    let record = state.record_mut().ok_or(WizardError::MissingRecord)?;
    definition.commit_step(submission, record);
    Ok(())
}

/// Show the rejected input back on the form without committing it.
fn retain_submitted(surface: &mut WizardSurface, submission: &Submission) {
    for field in &mut surface.fields {
        if let Some(value) = submission.get(&field.name) {
            field.value.clone_from(value);
        }
    }
}

fn default_title(display_name: &str) -> String {
    display_name.chars().take(MAX_TITLE_LENGTH).collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{ADDRESS, BIRTHDATE, FIRST_NAME, LAST_NAME, TELEPHONE};
    use crate::storage::MemoryStore;
    use crate::{Account, RecordId};

    fn values(pairs: &[(&str, &str)]) -> Submission {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn started() -> (WizardController, WizardSessionState) {
        let controller = WizardController::new();
        let mut state = WizardSessionState::new();
        controller
            .start(&mut state, Some(Record::draft("application")))
            .expect("start");
        (controller, state)
    }

    #[test]
    fn start_without_record_fails() {
        let controller = WizardController::new();
        let mut state = WizardSessionState::new();
        let err = controller.start(&mut state, None).expect_err("no record");
        assert!(matches!(err, WizardError::MissingRecord));
        assert!(state.is_empty());
    }

    #[test]
    fn start_prefers_session_record() {
        let (controller, mut state) = started();
        state
            .record_mut()
            .expect("record")
            .set(FIRST_NAME, "Kept");

        let surface = controller
            .start(&mut state, Some(Record::draft("application")))
            .expect("restart");

        assert_eq!(surface.fields[0].value, "Kept");
    }

    #[test]
    fn start_keeps_stored_step() {
        let (controller, mut state) = started();
        state.set_step(StepId::ContactDetails);

        let surface = controller
            .start(&mut state, Some(Record::draft("application")))
            .expect("restart");
        assert_eq!(surface.step, StepId::ContactDetails);
    }

    #[test]
    fn unknown_stored_step_resets_to_entry_step() {
        let (controller, mut state) = started();
        state.set_step_key("tampered");

        let surface = controller
            .start(&mut state, Some(Record::draft("application")))
            .expect("restart");

        assert_eq!(surface.step, StepId::PersonalDetails);
        assert_eq!(state.step_key(), Some("personal_details"));
    }

    #[test]
    fn failed_validation_keeps_typed_values() {
        let (controller, mut state) = started();
        let mut store = MemoryStore::new();
        let submitted = values(&[(FIRST_NAME, "Jane"), (LAST_NAME, ""), (BIRTHDATE, "")]);

        let outcome = controller
            .handle_navigation(
                &mut state,
                Action::Next,
                &submitted,
                &mut store,
                &Account::anonymous(),
            )
            .expect("navigate");

        let NavigationOutcome::Surface(surface) = outcome else {
            unreachable!("validation failure never submits");
        };
        assert_eq!(surface.errors.len(), 2);
        assert_eq!(surface.fields[0].value, "Jane");
        // Not committed.
        assert!(state.record().expect("record").get(FIRST_NAME).is_none());
    }

    #[test]
    fn jump_is_only_allowed_from_review() {
        let (controller, mut state) = started();
        let mut store = MemoryStore::new();

        let err = controller
            .handle_navigation(
                &mut state,
                Action::Jump(StepId::Review),
                &Submission::new(),
                &mut store,
                &Account::anonymous(),
            )
            .expect_err("jump from first step");
        assert!(matches!(err, WizardError::InvalidAction { .. }));
    }

    #[test]
    fn submit_off_review_is_rejected() {
        let (controller, mut state) = started();
        let mut store = MemoryStore::new();

        let err = controller
            .handle_navigation(
                &mut state,
                Action::Submit,
                &Submission::new(),
                &mut store,
                &Account::anonymous(),
            )
            .expect_err("submit from first step");
        assert!(matches!(
            err,
            WizardError::InvalidAction {
                action: Action::Submit,
                step: StepId::PersonalDetails
            }
        ));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn submit_keeps_existing_title_and_builds_link() {
        let controller = WizardController::new().with_link_base("https://apply.example.org/");
        let mut state = WizardSessionState::new();
        let mut record = Record::draft("application");
        record.set_title("Summer intake");
        record.set(ADDRESS, "1 Main St");
        record.set(TELEPHONE, "555-0100");
        state.set_record(record);
        state.set_step(StepId::Review);
        let mut store = MemoryStore::new();

        let outcome = controller
            .handle_navigation(
                &mut state,
                Action::Submit,
                &Submission::new(),
                &mut store,
                &Account::new(9, "jdoe"),
            )
            .expect("submit");

        let NavigationOutcome::Submitted(result) = outcome else {
            unreachable!("submit from review always submits");
        };
        assert_eq!(result.record_id, RecordId(1));
        assert_eq!(result.edit_link, "https://apply.example.org/application/1/edit");

        let saved = store.get(RecordId(1)).expect("saved");
        assert_eq!(saved.title(), Some("Summer intake"));
        assert!(state.is_empty());
    }

    #[test]
    fn default_title_is_bounded() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 10);
        assert_eq!(default_title(&long).chars().count(), MAX_TITLE_LENGTH);
    }
}
