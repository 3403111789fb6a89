//! # formstep-core
//!
//! The step-wizard engine for formstep - THE LOGIC.
//!
//! A user moves through `personal_details → contact_details → review`.
//! Each step writes into one in-progress [`Record`] held in session state;
//! the record is saved exactly once, when the user submits from the review
//! step. Saved records can be re-opened, in which case the wizard starts on
//! the review step.
//!
//! ## Layout
//!
//! - `types`: records, identifiers, surfaces, errors
//! - `steps`: the three step definitions and their shared field helpers
//! - `registry`: step identifier → step definition
//! - `session`: per-interaction state and the session store seam
//! - `controller`: start and navigation
//! - `storage`: record/session stores (in-memory, redb)
//! - `formats`: snapshot format for the file backend
//!
//! ## Architectural Constraints
//!
//! - Synchronous, no network dependencies
//! - Field validation failures are data, not errors
//! - Backward navigation never validates

// =============================================================================
// MODULES
// =============================================================================

pub mod controller;
pub mod formats;
pub mod primitives;
pub mod registry;
pub mod session;
pub mod steps;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Account, Action, ActingUser, DisplayItem, FieldError, FieldKind, FieldSpec, Navigation,
    NavigationOutcome, Record, RecordId, ReviewSection, SessionToken, StepId, StepJump,
    Submission, SubmissionResult, UserId, WizardError, WizardSurface,
};

// =============================================================================
// RE-EXPORTS: Wizard Engine
// =============================================================================

pub use controller::WizardController;
pub use registry::StepRegistry;
pub use session::{SessionStore, WizardSessionState};
pub use steps::{StepContent, StepDefinition};
pub use storage::{ClosingSession, MemoryStore, RecordStore, RedbStore, StorageBackend};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{SnapshotHeader, store_from_bytes, store_to_bytes};
