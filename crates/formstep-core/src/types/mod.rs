//! # Core Type Definitions
//!
//! This module contains the core types for the formstep wizard:
//! - Identifiers (`RecordId`, `UserId`, `SessionToken`)
//! - The backing record (`Record`)
//! - Step identity (`StepId`) and navigation actions (`Action`)
//! - The acting user seam (`ActingUser`, `Account`)
//! - Error types (`WizardError`)
//!
//! Surface types handed to rendering live in [`surface`].

mod surface;

pub use surface::{
    DisplayItem, FieldError, FieldKind, FieldSpec, Navigation, NavigationOutcome, ReviewSection,
    StepJump, SubmissionResult, WizardSurface,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Values submitted for one step, keyed by field name.
pub type Submission = BTreeMap<String, String>;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identity of a persisted record. Assigned by the record store on first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the user that owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Handle of one wizard session in a session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The persisted entity accumulating all wizard-collected data.
///
/// A record starts as an unsaved draft (no identity). Step commits write
/// field values onto it; the record store assigns an identity on first save.
/// Once assigned, the identity never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: Option<RecordId>,
    bundle: String,
    owner: Option<UserId>,
    title: Option<String>,
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an unsaved draft of the given bundle.
    #[must_use]
    pub fn draft(bundle: impl Into<String>) -> Self {
        Self {
            id: None,
            bundle: bundle.into(),
            owner: None,
            title: None,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Check whether the record has been saved at least once.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Assign the identity handed out by a record store.
    ///
    /// Re-assigning the same identity is accepted; changing it is not.
    pub fn assign_id(&mut self, id: RecordId) -> Result<(), WizardError> {
        match self.id {
            Some(current) if current != id => Err(WizardError::IdentityConflict {
                current,
                assigned: id,
            }),
            _ => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: UserId) {
        self.owner = Some(owner);
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Read a field value. Absent fields are `None`, never an error.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// All field values in name order.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

// =============================================================================
// STEP IDENTITY
// =============================================================================

/// One stage of the wizard, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    PersonalDetails,
    ContactDetails,
    Review,
}

impl StepId {
    /// Every step, first to last.
    pub const ALL: [StepId; 3] = [StepId::PersonalDetails, StepId::ContactDetails, StepId::Review];

    /// The key stored in session state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::PersonalDetails => "personal_details",
            StepId::ContactDetails => "contact_details",
            StepId::Review => "review",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| WizardError::UnknownStep(s.to_string()))
    }
}

/// A navigation event sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Next,
    Previous,
    Submit,
    /// Set the step directly (the review step's edit buttons).
    Jump(StepId),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Next => f.write_str("next"),
            Action::Previous => f.write_str("previous"),
            Action::Submit => f.write_str("submit"),
            Action::Jump(target) => write!(f, "jump:{}", target),
        }
    }
}

// =============================================================================
// ACTING USER
// =============================================================================

/// The user performing a submission.
pub trait ActingUser {
    fn user_id(&self) -> UserId;

    fn display_name(&self) -> &str;
}

/// A plain acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub name: String,
}

impl Account {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
        }
    }

    /// The anonymous user (id 0).
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(0, "anonymous")
    }
}

impl ActingUser for Account {
    fn user_id(&self) -> UserId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the formstep engine.
///
/// Field validation failures are not errors: they are returned as
/// [`FieldError`] data on the surface.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The wizard was invoked without a record.
    #[error("No record was supplied to the wizard")]
    MissingRecord,

    /// A step key outside the fixed step set.
    #[error("Unknown step: {0:?}")]
    UnknownStep(String),

    /// The action is not available on the current step.
    #[error("Action '{action}' is not available on step '{step}'")]
    InvalidAction { action: Action, step: StepId },

    /// No record with this identity exists in storage.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// A saved record's identity was about to change.
    #[error("Record identity {current} cannot be replaced with {assigned}")]
    IdentityConflict { current: RecordId, assigned: RecordId },

    /// No session with this token exists (never opened, expired, or removed).
    #[error("Session not found: {0}")]
    SessionNotFound(SessionToken),

    /// A storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system or network I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration (config file, environment or flags).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected at an entry surface before reaching the wizard.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_has_no_identity() {
        let record = Record::draft("application");
        assert!(!record.is_saved());
        assert_eq!(record.bundle(), "application");
        assert!(record.get("field_first_name").is_none());
    }

    #[test]
    fn assign_id_is_immutable_once_set() {
        let mut record = Record::draft("application");
        record.assign_id(RecordId(7)).expect("first assignment");
        record.assign_id(RecordId(7)).expect("same identity again");

        let err = record.assign_id(RecordId(8)).expect_err("identity change");
        assert!(matches!(err, WizardError::IdentityConflict { .. }));
        assert_eq!(record.id(), Some(RecordId(7)));
    }

    #[test]
    fn step_keys_round_trip() {
        for step in StepId::ALL {
            assert_eq!(step.as_str().parse::<StepId>().expect("parse"), step);
        }
    }

    #[test]
    fn unknown_step_key_is_rejected() {
        let err = "payment".parse::<StepId>().expect_err("unknown");
        assert!(matches!(err, WizardError::UnknownStep(ref key) if key == "payment"));
    }

    #[test]
    fn action_display_names_jump_target() {
        assert_eq!(Action::Next.to_string(), "next");
        assert_eq!(
            Action::Jump(StepId::ContactDetails).to_string(),
            "jump:contact_details"
        );
    }
}
