//! # Session Module
//!
//! Per-interaction wizard state and the store that keeps it between round
//! trips.
//!
//! - `WizardSessionState` holds the in-progress record and the raw step key
//! - The record, once set, is reused for every later step; it is never
//!   re-fetched from record storage mid-session
//! - State is cleared when the wizard is submitted
//!
//! The step is kept as the raw stored key rather than a `StepId` so that a
//! corrupted or tampered value survives deserialization and can be detected
//! and reset by the controller.

use crate::{Record, SessionToken, StepId, WizardError};
use serde::{Deserialize, Serialize};

/// The `record` and `step` slots of one wizard interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSessionState {
    record: Option<Record>,
    step: Option<String>,
}

impl WizardSessionState {
    /// Create an empty session state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        self.record.as_mut()
    }

    pub fn set_record(&mut self, record: Record) {
        self.record = Some(record);
    }

    /// The stored step key, exactly as stored.
    #[must_use]
    pub fn step_key(&self) -> Option<&str> {
        self.step.as_deref()
    }

    pub fn set_step(&mut self, step: StepId) {
        self.step = Some(step.as_str().to_string());
    }

    /// Store a raw step key. Used when restoring state from an external store.
    pub fn set_step_key(&mut self, key: impl Into<String>) {
        self.step = Some(key.into());
    }

    /// Check whether both slots are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record.is_none() && self.step.is_none()
    }

    /// Drop the record and step (submission or abandonment).
    pub fn clear(&mut self) {
        self.record = None;
        self.step = None;
    }
}

/// Storage for wizard session state across request/response cycles.
pub trait SessionStore {
    /// Allocate a token for a new, empty session.
    fn open_session(&mut self) -> Result<SessionToken, WizardError>;

    /// Load a session. `Ok(None)` when the token is unknown.
    fn load_session(&self, token: SessionToken) -> Result<Option<WizardSessionState>, WizardError>;

    /// Write a session back after a controller call.
    fn store_session(
        &mut self,
        token: SessionToken,
        state: &WizardSessionState,
    ) -> Result<(), WizardError>;

    /// Forget a session entirely.
    fn remove_session(&mut self, token: SessionToken) -> Result<(), WizardError>;

    /// Load a session, failing with `WizardError::SessionNotFound` if unknown.
    fn require_session(&self, token: SessionToken) -> Result<WizardSessionState, WizardError> {
        self.load_session(token)?
            .ok_or(WizardError::SessionNotFound(token))
    }
}

// =============================================================================
// TESTS
// =============================================================================
