//! # Wizard Primitives
//!
//! Fixed constants for the formstep engine. These are compiled into the
//! binary and are immutable at runtime.

/// Bundle (record type) used for every record the wizard creates.
pub const APPLICATION_BUNDLE: &str = "application";

/// Magic bytes for the formstep snapshot file header.
///
/// - File Header = Magic Bytes ("FSTP") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"FSTP";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const FORMAT_VERSION: u8 = 1;

/// Route template for the edit page of a saved record.
///
/// `{id}` is replaced with the record identity.
pub const EDIT_LINK_TEMPLATE: &str = "/application/{id}/edit";

/// Confirmation message shown after a successful submission.
pub const SUBMITTED_MESSAGE: &str =
    "Thank you, your application has been saved. You can edit it here.";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for a single submitted field value, in bytes.
///
/// Enforced at the API boundary before values reach the controller.
pub const MAX_FIELD_VALUE_LENGTH: usize = 4096;

/// Maximum number of values in one submission.
pub const MAX_SUBMISSION_FIELDS: usize = 32;

/// Maximum length for a record title, in bytes.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Build the edit link for a saved record.
#[must_use]
pub fn edit_link(id: u64) -> String {
    EDIT_LINK_TEMPLATE.replace("{id}", &id.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
