//! # Snapshot Format
//!
//! Binary serialization of a [`MemoryStore`] for the file backend.
//! File I/O operations are in the app layer.
//!
//! Format: Header (5 bytes) + postcard-serialized store.
//! - 4 bytes: Magic ("FSTP")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is decoded.

use crate::storage::MemoryStore;
use crate::{WizardError, primitives};

/// Maximum accepted snapshot size (64 MB).
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024;

/// Header length in bytes.
const HEADER_LEN: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header that precedes every snapshot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), WizardError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(WizardError::Serialization(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(WizardError::Serialization(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WizardError> {
        if bytes.len() < HEADER_LEN {
            return Err(WizardError::Serialization("Header too short".to_string()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a store to bytes (header + payload).
pub fn store_to_bytes(store: &MemoryStore) -> Result<Vec<u8>, WizardError> {
    let payload =
        postcard::to_stdvec(store).map_err(|e| WizardError::Serialization(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a store from bytes.
pub fn store_from_bytes(bytes: &[u8]) -> Result<MemoryStore, WizardError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(WizardError::Serialization(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        WizardError::Serialization(format!("Failed to deserialize snapshot: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::storage::RecordStore;
    use crate::{Record, RecordId};

    #[test]
    fn snapshot_preserves_records_and_counters() {
        let mut store = MemoryStore::new();
        let mut record = Record::draft("application");
        record.set("field_address", "1 Main St");
        store.save(&record).expect("save");
        store.open_session().expect("session");

        let bytes = store_to_bytes(&store).expect("serialize");
        let mut restored = store_from_bytes(&bytes).expect("deserialize");

        assert_eq!(restored, store);
        assert_eq!(
            restored.save(&Record::draft("application")).expect("save"),
            RecordId(2)
        );
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(store_from_bytes(&bytes).is_err());
    }

    #[test]
    fn short_input_rejected() {
        let err = store_from_bytes(b"FST").expect_err("too short");
        assert!(matches!(err, WizardError::Serialization(_)));
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = store_to_bytes(&MemoryStore::new()).expect("serialize");
        bytes[4] = primitives::FORMAT_VERSION + 1;
        assert!(store_from_bytes(&bytes).is_err());
    }
}
