//! # redb-backed Store
//!
//! A disk-backed record and session store using the redb embedded database.
//!
//! - ACID transactions: a submission saves the record and closes its session
//!   in a single write transaction (`save_closing`)
//! - Crash safety (copy-on-write B-trees)
//! - Sessions survive server restarts, so a wizard can be resumed by token
//!
//! Records and session states are stored as postcard bytes.

use super::RecordStore;
use crate::session::{SessionStore, WizardSessionState};
use crate::{Record, RecordId, SessionToken, WizardError};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for records: RecordId(u64) -> serialized Record bytes
const RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("records");

/// Table for sessions: SessionToken(u64) -> serialized WizardSessionState bytes
const SESSIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("sessions");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_RECORD_ID: &str = "next_record_id";
const NEXT_SESSION_ID: &str = "next_session_id";

/// A disk-backed store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next record identity to hand out.
    next_record_id: u64,
    /// Next session token to hand out.
    next_session_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_record_id", &self.next_record_id)
            .field("next_session_id", &self.next_session_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WizardError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| WizardError::Storage(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(RECORDS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(SESSIONS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }

        // Load counters
        let (next_record_id, next_session_id) = {
            let read_txn = db
                .begin_read()
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            let records = table
                .get(NEXT_RECORD_ID)
                .map_err(|e| WizardError::Storage(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(1);
            let sessions = table
                .get(NEXT_SESSION_ID)
                .map_err(|e| WizardError::Storage(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(1);
            (records, sessions)
        };

        Ok(Self {
            db,
            next_record_id,
            next_session_id,
        })
    }

    /// Number of saved records.
    pub fn record_count(&self) -> Result<usize, WizardError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS)
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    /// Save `record` and drop the session `token` in one write transaction.
    ///
    /// When the transaction fails neither the record nor the session changes.
    pub fn save_closing(
        &mut self,
        record: &Record,
        token: SessionToken,
    ) -> Result<RecordId, WizardError> {
        self.write_record(record, Some(token))
    }

    fn write_record(
        &mut self,
        record: &Record,
        close: Option<SessionToken>,
    ) -> Result<RecordId, WizardError> {
        let id = match record.id() {
            Some(id) => id,
            None => RecordId(self.next_record_id),
        };
        let next_record_id = self.next_record_id.max(id.0.saturating_add(1));

        let mut stored = record.clone();
        stored.assign_id(id)?;
        let bytes = postcard::to_allocvec(&stored)
            .map_err(|e| WizardError::Serialization(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        {
            let mut records = write_txn
                .open_table(RECORDS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            records
                .insert(id.0, bytes.as_slice())
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        {
            let mut meta = write_txn
                .open_table(METADATA)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            meta.insert(NEXT_RECORD_ID, next_record_id)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        if let Some(token) = close {
            let mut sessions = write_txn
                .open_table(SESSIONS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            sessions
                .remove(token.0)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| WizardError::Storage(e.to_string()))?;

        // Only advance the counter once the transaction is durable.
        self.next_record_id = next_record_id;
        Ok(id)
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), WizardError> {
        self.db
            .compact()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// RECORDSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl RecordStore for RedbStore {
    fn load(&self, id: RecordId) -> Result<Record, WizardError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS)
            .map_err(|e| WizardError::Storage(e.to_string()))?;

        match table
            .get(id.0)
            .map_err(|e| WizardError::Storage(e.to_string()))?
        {
            Some(data) => postcard::from_bytes(data.value())
                .map_err(|e| WizardError::Serialization(e.to_string())),
            None => Err(WizardError::RecordNotFound(id)),
        }
    }

    fn save(&mut self, record: &Record) -> Result<RecordId, WizardError> {
        self.write_record(record, None)
    }

    fn list(&self) -> Result<Vec<Record>, WizardError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(RECORDS)
            .map_err(|e| WizardError::Storage(e.to_string()))?;

        let mut records = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| WizardError::Storage(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| WizardError::Storage(e.to_string()))?;
            let record: Record = postcard::from_bytes(value.value())
                .map_err(|e| WizardError::Serialization(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }
}

// =============================================================================
// SESSIONSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl RedbStore {
    fn write_session(
        &self,
        token: SessionToken,
        state: &WizardSessionState,
        next_session_id: u64,
    ) -> Result<(), WizardError> {
        let bytes = postcard::to_allocvec(state)
            .map_err(|e| WizardError::Serialization(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        {
            let mut sessions = write_txn
                .open_table(SESSIONS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            sessions
                .insert(token.0, bytes.as_slice())
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        {
            let mut meta = write_txn
                .open_table(METADATA)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            meta.insert(NEXT_SESSION_ID, next_session_id)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| WizardError::Storage(e.to_string()))
    }
}

impl SessionStore for RedbStore {
    fn open_session(&mut self) -> Result<SessionToken, WizardError> {
        let token = SessionToken(self.next_session_id);
        let next = self.next_session_id.saturating_add(1);
        self.write_session(token, &WizardSessionState::new(), next)?;
        self.next_session_id = next;
        Ok(token)
    }

    fn load_session(&self, token: SessionToken) -> Result<Option<WizardSessionState>, WizardError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        let table = read_txn
            .open_table(SESSIONS)
            .map_err(|e| WizardError::Storage(e.to_string()))?;

        match table
            .get(token.0)
            .map_err(|e| WizardError::Storage(e.to_string()))?
        {
            Some(data) => {
                let state = postcard::from_bytes(data.value())
                    .map_err(|e| WizardError::Serialization(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    fn store_session(
        &mut self,
        token: SessionToken,
        state: &WizardSessionState,
    ) -> Result<(), WizardError> {
        self.write_session(token, state, self.next_session_id)
    }

    fn remove_session(&mut self, token: SessionToken) -> Result<(), WizardError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| WizardError::Storage(e.to_string()))?;
        {
            let mut sessions = write_txn
                .open_table(SESSIONS)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
            sessions
                .remove(token.0)
                .map_err(|e| WizardError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| WizardError::Storage(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
