//! # Storage Module
//!
//! Record storage and session storage behind two traits:
//! - [`RecordStore`]: drafts, load by identity, save (assigns identity)
//! - [`SessionStore`](crate::session::SessionStore): wizard state between round trips
//!
//! ## Backends
//!
//! - `MemoryStore`: BTreeMap-backed (fast, volatile unless snapshotted to a file)
//! - `RedbStore`: disk-backed ACID storage using redb
//!
//! `StorageBackend` selects one of the two at runtime and forwards both traits.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::session::{SessionStore, WizardSessionState};
use crate::{Record, RecordId, SessionToken, WizardError};
use std::path::Path;

/// Persistence for wizard records.
pub trait RecordStore {
    /// Create an unsaved record of the given bundle.
    fn new_draft(&self, bundle: &str) -> Record {
        Record::draft(bundle)
    }

    /// Load a saved record, failing with `WizardError::RecordNotFound`.
    fn load(&self, id: RecordId) -> Result<Record, WizardError>;

    /// Save a record and return its identity.
    ///
    /// Records without an identity get a fresh one; records with an identity
    /// overwrite the stored copy.
    fn save(&mut self, record: &Record) -> Result<RecordId, WizardError>;

    /// All saved records in identity order.
    fn list(&self) -> Result<Vec<Record>, WizardError>;
}

/// Storage backend for the wizard.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    /// Open or create a redb-backed store at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, WizardError> {
        Ok(Self::Persistent(RedbStore::open(path)?))
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, StorageBackend::Persistent(_))
    }

    /// The in-memory store, if that is the active backend.
    #[must_use]
    pub fn memory(&self) -> Option<&MemoryStore> {
        match self {
            StorageBackend::InMemory(store) => Some(store),
            StorageBackend::Persistent(_) => None,
        }
    }

    /// Save `record` and drop the session `token` as one atomic step.
    pub fn save_closing(
        &mut self,
        record: &Record,
        token: SessionToken,
    ) -> Result<RecordId, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.save_closing(record, token),
            StorageBackend::Persistent(store) => store.save_closing(record, token),
        }
    }

    /// A record store whose `save` also closes the session `token`.
    ///
    /// Hand this to the controller when navigating a stored session, so a
    /// submission and the end of its session are committed together.
    pub fn closing(&mut self, token: SessionToken) -> ClosingSession<'_> {
        ClosingSession {
            backend: self,
            token,
        }
    }
}

/// Record store view that closes one session on save. See [`StorageBackend::closing`].
#[derive(Debug)]
pub struct ClosingSession<'a> {
    backend: &'a mut StorageBackend,
    token: SessionToken,
}

impl RecordStore for ClosingSession<'_> {
    fn load(&self, id: RecordId) -> Result<Record, WizardError> {
        self.backend.load(id)
    }

    fn save(&mut self, record: &Record) -> Result<RecordId, WizardError> {
        self.backend.save_closing(record, self.token)
    }

    fn list(&self) -> Result<Vec<Record>, WizardError> {
        self.backend.list()
    }
}

impl RecordStore for StorageBackend {
    fn load(&self, id: RecordId) -> Result<Record, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.load(id),
            StorageBackend::Persistent(store) => store.load(id),
        }
    }

    fn save(&mut self, record: &Record) -> Result<RecordId, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.save(record),
            StorageBackend::Persistent(store) => store.save(record),
        }
    }

    fn list(&self) -> Result<Vec<Record>, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.list(),
            StorageBackend::Persistent(store) => store.list(),
        }
    }
}

impl SessionStore for StorageBackend {
    fn open_session(&mut self) -> Result<SessionToken, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.open_session(),
            StorageBackend::Persistent(store) => store.open_session(),
        }
    }

    fn load_session(&self, token: SessionToken) -> Result<Option<WizardSessionState>, WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.load_session(token),
            StorageBackend::Persistent(store) => store.load_session(token),
        }
    }

    fn store_session(
        &mut self,
        token: SessionToken,
        state: &WizardSessionState,
    ) -> Result<(), WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.store_session(token, state),
            StorageBackend::Persistent(store) => store.store_session(token, state),
        }
    }

    fn remove_session(&mut self, token: SessionToken) -> Result<(), WizardError> {
        match self {
            StorageBackend::InMemory(store) => store.remove_session(token),
            StorageBackend::Persistent(store) => store.remove_session(token),
        }
    }
}
