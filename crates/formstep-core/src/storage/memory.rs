//! In-memory record and session store.

use super::RecordStore;
use crate::session::{SessionStore, WizardSessionState};
use crate::{Record, RecordId, SessionToken, WizardError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// BTreeMap-backed store. Serializable so the file backend can snapshot it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    records: BTreeMap<RecordId, Record>,
    sessions: BTreeMap<SessionToken, WizardSessionState>,
    next_record_id: u64,
    next_session_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            sessions: BTreeMap::new(),
            next_record_id: 1,
            next_session_id: 1,
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a saved record without cloning it.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Save `record` and drop the session `token` in one step.
    pub fn save_closing(
        &mut self,
        record: &Record,
        token: SessionToken,
    ) -> Result<RecordId, WizardError> {
        let id = self.save(record)?;
        self.sessions.remove(&token);
        Ok(id)
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, id: RecordId) -> Result<Record, WizardError> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(WizardError::RecordNotFound(id))
    }

    fn save(&mut self, record: &Record) -> Result<RecordId, WizardError> {
        let id = match record.id() {
            Some(id) => id,
            None => RecordId(self.next_record_id),
        };
        self.next_record_id = self.next_record_id.max(id.0.saturating_add(1));

        let mut stored = record.clone();
        stored.assign_id(id)?;
        self.records.insert(id, stored);
        Ok(id)
    }

    fn list(&self) -> Result<Vec<Record>, WizardError> {
        Ok(self.records.values().cloned().collect())
    }
}

impl SessionStore for MemoryStore {
    fn open_session(&mut self) -> Result<SessionToken, WizardError> {
        let token = SessionToken(self.next_session_id);
        self.next_session_id = self.next_session_id.saturating_add(1);
        self.sessions.insert(token, WizardSessionState::new());
        Ok(token)
    }

    fn load_session(&self, token: SessionToken) -> Result<Option<WizardSessionState>, WizardError> {
        Ok(self.sessions.get(&token).cloned())
    }

    fn store_session(
        &mut self,
        token: SessionToken,
        state: &WizardSessionState,
    ) -> Result<(), WizardError> {
        self.sessions.insert(token, state.clone());
        Ok(())
    }

    fn remove_session(&mut self, token: SessionToken) -> Result<(), WizardError> {
        self.sessions.remove(&token);
        Ok(())
    }
}
