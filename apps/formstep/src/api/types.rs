//! # API Request/Response Types
//!
//! JSON structures for the HTTP API.

use formstep_core::{
    Action, Record, SessionToken, Submission, SubmissionResult, WizardError, WizardSurface,
    primitives::{MAX_FIELD_VALUE_LENGTH, MAX_SUBMISSION_FIELDS},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// NAVIGATE REQUEST
// =============================================================================

/// One navigation event posted from the wizard form.
///
/// ```json
/// { "action": "next", "values": { "field_first_name": "Jane" } }
/// { "action": { "jump": "contact_details" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub action: Action,
    #[serde(default)]
    pub values: Submission,
}

impl NavigateRequest {
    /// Bound the submission before it reaches the wizard.
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.values.len() > MAX_SUBMISSION_FIELDS {
            return Err(WizardError::InvalidInput(format!(
                "Submission has {} fields, maximum is {}",
                self.values.len(),
                MAX_SUBMISSION_FIELDS
            )));
        }
        for (name, value) in &self.values {
            if name.len() > MAX_FIELD_VALUE_LENGTH || value.len() > MAX_FIELD_VALUE_LENGTH {
                return Err(WizardError::InvalidInput(format!(
                    "Field '{}' exceeds maximum {} bytes",
                    name.chars().take(64).collect::<String>(),
                    MAX_FIELD_VALUE_LENGTH
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// WIZARD RESPONSE
// =============================================================================

/// Response for every wizard entry and navigation call.
///
/// Exactly one of `surface` and `submission` is set on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardResponse {
    pub success: bool,
    pub session: Option<u64>,
    pub surface: Option<WizardSurface>,
    pub submission: Option<SubmissionResult>,
    pub error: Option<String>,
}

impl WizardResponse {
    pub fn surface(session: SessionToken, surface: WizardSurface) -> Self {
        Self {
            success: true,
            session: Some(session.0),
            surface: Some(surface),
            submission: None,
            error: None,
        }
    }

    pub fn submitted(result: SubmissionResult) -> Self {
        Self {
            success: true,
            session: None,
            surface: None,
            submission: Some(result),
            error: None,
        }
    }

    /// The session ended without a submission.
    pub fn abandoned(session: SessionToken) -> Self {
        Self {
            success: true,
            session: Some(session.0),
            surface: None,
            submission: None,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            session: None,
            surface: None,
            submission: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RECORD RESPONSES
// =============================================================================

/// A saved application as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordJson {
    pub id: Option<u64>,
    pub bundle: String,
    pub owner: Option<u64>,
    pub title: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl From<&Record> for RecordJson {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id().map(|id| id.0),
            bundle: record.bundle().to_string(),
            owner: record.owner().map(|u| u.0),
            title: record.title().map(str::to_string),
            fields: record.fields().clone(),
        }
    }
}

/// Single record response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub record: Option<RecordJson>,
    pub error: Option<String>,
}

impl RecordResponse {
    pub fn found(record: &Record) -> Self {
        Self {
            success: true,
            record: Some(RecordJson::from(record)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            record: None,
            error: Some(msg.into()),
        }
    }
}

/// Record listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub success: bool,
    pub records: Vec<RecordJson>,
    pub error: Option<String>,
}

impl RecordListResponse {
    pub fn list(records: &[Record]) -> Self {
        Self {
            success: true,
            records: records.iter().map(RecordJson::from).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            records: Vec::new(),
            error: Some(msg.into()),
        }
    }
}
