//! # Property-Based Tests
//!
//! Invariants of the wizard engine that must hold for any input.

use formstep_core::steps::{ADDRESS, BIRTHDATE, FIRST_NAME, LAST_NAME, TELEPHONE};
use formstep_core::{
    Account, Action, MemoryStore, NavigationOutcome, Record, RecordStore, StepId, StepRegistry,
    Submission, WizardController, WizardSessionState, store_from_bytes, store_to_bytes,
};
use proptest::collection::btree_map;
use proptest::prelude::*;

fn field_value() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just("   ".to_string()), "[a-zA-Z0-9 ,.-]{1,24}"]
}

fn personal_submission() -> impl Strategy<Value = Submission> {
    (field_value(), field_value(), field_value()).prop_map(|(first, last, birth)| {
        [(FIRST_NAME, first), (LAST_NAME, last), (BIRTHDATE, birth)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    })
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Next),
        Just(Action::Previous),
        Just(Action::Submit),
        Just(Action::Jump(StepId::PersonalDetails)),
        Just(Action::Jump(StepId::ContactDetails)),
        Just(Action::Jump(StepId::Review)),
    ]
}

fn any_submission() -> impl Strategy<Value = Submission> {
    btree_map(
        prop_oneof![
            Just(FIRST_NAME.to_string()),
            Just(LAST_NAME.to_string()),
            Just(BIRTHDATE.to_string()),
            Just(ADDRESS.to_string()),
            Just(TELEPHONE.to_string()),
        ],
        field_value(),
        0..5,
    )
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Next from personal details advances iff every required field is non-blank.
    #[test]
    fn next_advances_only_when_all_required_present(submission in personal_submission()) {
        let controller = WizardController::new();
        let mut state = WizardSessionState::new();
        controller.start(&mut state, Some(Record::draft("application"))).expect("start");

        let all_present = submission.values().all(|v| !v.trim().is_empty());
        let outcome = controller
            .handle_navigation(
                &mut state,
                Action::Next,
                &submission,
                &mut MemoryStore::new(),
                &Account::anonymous(),
            )
            .expect("navigate");

        let NavigationOutcome::Surface(surface) = outcome else {
            return Err(TestCaseError::fail("next never submits"));
        };

        if all_present {
            prop_assert_eq!(surface.step, StepId::ContactDetails);
            prop_assert!(surface.errors.is_empty());
        } else {
            let blanks = submission.values().filter(|v| v.trim().is_empty()).count();
            prop_assert_eq!(surface.step, StepId::PersonalDetails);
            prop_assert_eq!(surface.errors.len(), blanks);
            prop_assert_eq!(state.step_key(), Some("personal_details"));
        }
    }

    /// Populating a step never changes the record.
    #[test]
    fn populate_is_idempotent(submission in any_submission()) {
        let mut record = Record::draft("application");
        for (k, v) in &submission {
            record.set(k.clone(), v.clone());
        }
        let before = record.clone();

        for id in StepId::ALL {
            let step = StepRegistry::new().resolve(id);
            let first = step.populate_surface(&record);
            let second = step.populate_surface(&record);
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(record, before);
    }

    /// Whatever sequence of events arrives, the stored step stays in the step set
    /// and at most one record is saved per submission.
    #[test]
    fn arbitrary_navigation_keeps_session_consistent(
        events in proptest::collection::vec((any_action(), any_submission()), 1..30)
    ) {
        let controller = WizardController::new();
        let mut state = WizardSessionState::new();
        let mut store = MemoryStore::new();
        let user = Account::new(7, "tester");
        controller.start(&mut state, Some(Record::draft("application"))).expect("start");

        let mut submissions = 0usize;
        for (action, submission) in &events {
            if state.is_empty() {
                controller.start(&mut state, Some(Record::draft("application"))).expect("restart");
            }
            match controller.handle_navigation(&mut state, *action, submission, &mut store, &user) {
                Ok(NavigationOutcome::Submitted(_)) => {
                    submissions += 1;
                    prop_assert!(state.is_empty());
                }
                Ok(NavigationOutcome::Surface(surface)) => {
                    prop_assert_eq!(state.step_key(), Some(surface.step.as_str()));
                }
                Err(_) => {
                    let key = state.step_key().expect("step kept on error");
                    prop_assert!(key.parse::<StepId>().is_ok());
                }
            }
        }

        prop_assert_eq!(store.record_count(), submissions);
        for record in store.list().expect("list") {
            prop_assert!(record.is_saved());
            prop_assert_eq!(record.owner().map(|u| u.0), Some(7));
        }
    }

    /// A snapshot restores the exact store.
    #[test]
    fn snapshot_restores_store(records in proptest::collection::vec(any_submission(), 0..10)) {
        let mut store = MemoryStore::new();
        for fields in records {
            let mut record = Record::draft("application");
            for (k, v) in fields {
                record.set(k, v);
            }
            store.save(&record).expect("save");
        }

        let bytes = store_to_bytes(&store).expect("serialize");
        let restored = store_from_bytes(&bytes).expect("deserialize");
        prop_assert_eq!(restored, store);
    }
}
