//! # Wizard Flow Tests
//!
//! End-to-end behaviour of the controller across several navigation events,
//! as a hosting surface would drive it.

#![allow(clippy::unwrap_used, clippy::panic)]

use formstep_core::steps::{ADDRESS, BIRTHDATE, FIRST_NAME, LAST_NAME, TELEPHONE};
use formstep_core::{
    Account, Action, MemoryStore, NavigationOutcome, Record, RecordId, RecordStore, StepId,
    Submission, SubmissionResult, WizardController, WizardError, WizardSessionState,
    WizardSurface,
};

// =============================================================================
// HELPERS
// =============================================================================

fn values(pairs: &[(&str, &str)]) -> Submission {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn personal() -> Submission {
    values(&[
        (FIRST_NAME, "Jane"),
        (LAST_NAME, "Doe"),
        (BIRTHDATE, "1990-01-01"),
    ])
}

fn contact() -> Submission {
    values(&[(ADDRESS, "1 Main St"), (TELEPHONE, "555-0100")])
}

struct Wizard {
    controller: WizardController,
    state: WizardSessionState,
    store: MemoryStore,
    user: Account,
}

impl Wizard {
    fn new() -> Self {
        Self {
            controller: WizardController::new(),
            state: WizardSessionState::new(),
            store: MemoryStore::new(),
            user: Account::new(42, "jdoe"),
        }
    }

    fn start(&mut self, record: Record) -> WizardSurface {
        self.controller
            .start(&mut self.state, Some(record))
            .expect("start")
    }

    fn navigate(&mut self, action: Action, submission: &Submission) -> NavigationOutcome {
        self.controller
            .handle_navigation(
                &mut self.state,
                action,
                submission,
                &mut self.store,
                &self.user,
            )
            .expect("navigate")
    }

    fn surface(&mut self, action: Action, submission: &Submission) -> WizardSurface {
        match self.navigate(action, submission) {
            NavigationOutcome::Surface(surface) => surface,
            NavigationOutcome::Submitted(result) => {
                panic!("expected a surface, got submission {:?}", result)
            }
        }
    }

    fn submit(&mut self) -> SubmissionResult {
        match self.navigate(Action::Submit, &Submission::new()) {
            NavigationOutcome::Submitted(result) => result,
            NavigationOutcome::Surface(surface) => {
                panic!("expected a submission, got surface {:?}", surface.step)
            }
        }
    }

    fn step(&self) -> Option<&str> {
        self.state.step_key()
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.state.record().and_then(|r| r.get(name))
    }
}

// =============================================================================
// START
// =============================================================================

#[test]
fn new_record_starts_on_personal_details() {
    let mut wizard = Wizard::new();
    let surface = wizard.start(Record::draft("application"));

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert!(!surface.navigation.previous_enabled);
    assert!(surface.navigation.next_visible);
    assert!(!surface.navigation.submit_visible);
    assert_eq!(wizard.step(), Some("personal_details"));
}

#[test]
fn saved_record_starts_on_review() {
    let mut wizard = Wizard::new();
    let id = wizard
        .store
        .save(&Record::draft("application"))
        .expect("seed");
    let saved = wizard.store.load(id).expect("load");

    let surface = wizard.start(saved);

    assert_eq!(surface.step, StepId::Review);
    assert!(surface.navigation.submit_visible);
    assert!(!surface.navigation.next_visible);
    assert_eq!(surface.sections.len(), 2);
}

// =============================================================================
// NEXT
// =============================================================================

#[test]
fn empty_first_name_blocks_next() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));

    let surface = wizard.surface(
        Action::Next,
        &values(&[(FIRST_NAME, ""), (LAST_NAME, "Doe"), (BIRTHDATE, "1990-01-01")]),
    );

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert_eq!(surface.errors.len(), 1);
    assert_eq!(
        surface.error_for(FIRST_NAME).map(|e| e.message.as_str()),
        Some("Please enter your first name")
    );
    assert_eq!(wizard.step(), Some("personal_details"));
    assert!(wizard.field(LAST_NAME).is_none(), "nothing committed");
}

#[test]
fn valid_personal_details_commit_and_advance() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));

    let surface = wizard.surface(Action::Next, &personal());

    assert_eq!(surface.step, StepId::ContactDetails);
    assert!(surface.errors.is_empty());
    assert_eq!(wizard.step(), Some("contact_details"));
    assert_eq!(wizard.field(FIRST_NAME), Some("Jane"));
    assert_eq!(wizard.field(LAST_NAME), Some("Doe"));
    assert_eq!(wizard.field(BIRTHDATE), Some("1990-01-01"));
}

#[test]
fn next_on_review_is_invalid() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());
    wizard.surface(Action::Next, &contact());

    let err = wizard
        .controller
        .handle_navigation(
            &mut wizard.state,
            Action::Next,
            &Submission::new(),
            &mut wizard.store,
            &wizard.user,
        )
        .expect_err("review has no next step");

    assert!(matches!(
        err,
        WizardError::InvalidAction {
            action: Action::Next,
            step: StepId::Review
        }
    ));
}

// =============================================================================
// PREVIOUS
// =============================================================================

#[test]
fn previous_skips_validation_and_commits() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());

    let surface = wizard.surface(
        Action::Previous,
        &values(&[(ADDRESS, "1 Main St"), (TELEPHONE, "")]),
    );

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert!(surface.errors.is_empty());
    assert_eq!(wizard.field(TELEPHONE), Some(""));
    assert_eq!(wizard.field(ADDRESS), Some("1 Main St"));
    // The personal details surface shows what was committed before.
    assert_eq!(surface.fields[0].value, "Jane");
}

#[test]
fn previous_on_first_step_is_a_no_op() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));

    let surface = wizard.surface(Action::Previous, &personal());

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert_eq!(wizard.step(), Some("personal_details"));
    assert!(wizard.field(FIRST_NAME).is_none());
}

#[test]
fn next_then_previous_returns_to_same_step() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());

    wizard.surface(Action::Next, &contact());
    let back = wizard.surface(Action::Previous, &Submission::new());

    assert_eq!(back.step, StepId::ContactDetails);
    assert_eq!(back.fields[1].value, "555-0100");
}

// =============================================================================
// REVIEW JUMPS
// =============================================================================

#[test]
fn review_jump_sets_step_directly() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());
    wizard.surface(Action::Next, &contact());

    let surface = wizard.surface(Action::Jump(StepId::PersonalDetails), &personal());

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert_eq!(surface.fields[2].value, "1990-01-01");

    let surface = wizard.surface(Action::Next, &personal());
    assert_eq!(surface.step, StepId::ContactDetails);
}

#[test]
fn review_summarises_committed_values() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());
    let review = wizard.surface(Action::Next, &contact());

    let items: Vec<(&str, &str)> = review
        .sections
        .iter()
        .flat_map(|s| &s.items)
        .map(|i| (i.label.as_str(), i.value.as_str()))
        .collect();

    assert_eq!(
        items,
        vec![
            ("First Name", "Jane"),
            ("Last Name", "Doe"),
            ("Birthdate", "1990-01-01"),
            ("Address", "1 Main St"),
            ("Telephone", "555-0100"),
        ]
    );
}

// =============================================================================
// SUBMIT
// =============================================================================

#[test]
fn submit_saves_once_and_clears_session() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());
    wizard.surface(Action::Next, &contact());
    assert_eq!(wizard.store.record_count(), 0, "nothing saved before submit");

    let result = wizard.submit();

    assert_eq!(result.record_id, RecordId(1));
    assert_eq!(result.edit_link, "/application/1/edit");
    assert!(result.message.starts_with("Thank you"));
    assert!(wizard.state.is_empty());

    let saved = wizard.store.load(result.record_id).expect("saved");
    assert_eq!(saved.owner().map(|u| u.0), Some(42));
    assert_eq!(saved.title(), Some("jdoe"));
    assert_eq!(saved.get(TELEPHONE), Some("555-0100"));
    assert_eq!(wizard.store.record_count(), 1);
}

#[test]
fn fresh_start_after_submit_sees_no_stale_state() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.surface(Action::Next, &personal());
    wizard.surface(Action::Next, &contact());
    wizard.submit();

    let surface = wizard.start(Record::draft("application"));

    assert_eq!(surface.step, StepId::PersonalDetails);
    assert!(surface.fields.iter().all(|f| f.value.is_empty()));
}

#[test]
fn editing_saved_record_keeps_identity_and_title() {
    let mut wizard = Wizard::new();
    let mut seeded = Record::draft("application");
    seeded.set_title("Original");
    seeded.set(FIRST_NAME, "Jane");
    let id = wizard.store.save(&seeded).expect("seed");

    let saved = wizard.store.load(id).expect("load");
    wizard.start(saved);
    wizard.surface(Action::Jump(StepId::ContactDetails), &Submission::new());
    wizard.surface(
        Action::Next,
        &values(&[(ADDRESS, "2 High St"), (TELEPHONE, "555-0111")]),
    );
    let result = wizard.submit();

    assert_eq!(result.record_id, id);
    let saved = wizard.store.load(id).expect("load");
    assert_eq!(saved.title(), Some("Original"));
    assert_eq!(saved.get(ADDRESS), Some("2 High St"));
    assert_eq!(saved.get(FIRST_NAME), Some("Jane"));
    assert_eq!(wizard.store.record_count(), 1);
}

/// A record store whose saves always fail.
struct BrokenStore;

impl RecordStore for BrokenStore {
    fn load(&self, id: RecordId) -> Result<Record, WizardError> {
        Err(WizardError::RecordNotFound(id))
    }

    fn save(&mut self, _record: &Record) -> Result<RecordId, WizardError> {
        Err(WizardError::Storage("disk full".to_string()))
    }

    fn list(&self) -> Result<Vec<Record>, WizardError> {
        Ok(Vec::new())
    }
}

#[test]
fn failed_save_keeps_session_state() {
    let controller = WizardController::new();
    let user = Account::new(1, "jdoe");
    let mut state = WizardSessionState::new();
    controller
        .start(&mut state, Some(Record::draft("application")))
        .expect("start");
    state.set_step(StepId::Review);
    let before = state.clone();

    let err = controller
        .handle_navigation(
            &mut state,
            Action::Submit,
            &Submission::new(),
            &mut BrokenStore,
            &user,
        )
        .expect_err("save fails");

    assert!(matches!(err, WizardError::Storage(_)));
    assert_eq!(state, before);
    assert!(state.record().is_some_and(|r| r.owner().is_none()));
}

#[test]
fn navigation_without_record_fails() {
    let controller = WizardController::new();
    let mut state = WizardSessionState::new();
    state.set_step(StepId::ContactDetails);

    let err = controller
        .handle_navigation(
            &mut state,
            Action::Next,
            &contact(),
            &mut MemoryStore::new(),
            &Account::anonymous(),
        )
        .expect_err("no record in session");

    assert!(matches!(err, WizardError::MissingRecord));
}

#[test]
fn tampered_step_resets_before_navigation() {
    let mut wizard = Wizard::new();
    wizard.start(Record::draft("application"));
    wizard.state.set_step_key("payment");

    let surface = wizard.surface(Action::Next, &personal());

    assert_eq!(surface.step, StepId::ContactDetails);
}
