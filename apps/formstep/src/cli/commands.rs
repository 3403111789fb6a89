//! # CLI Command Implementations

use super::wizard::{WizardExit, run_terminal_wizard};
use crate::api::{self, AppState, HttpSettings, RecordJson};
use crate::config::{BackendKind, Settings};
use formstep_core::{
    Account, Record, RecordId, RecordStore, StepId, StorageBackend, WizardController,
    WizardError, formats::MAX_SNAPSHOT_SIZE, primitives::APPLICATION_BUNDLE, store_from_bytes,
    store_to_bytes,
};
use std::path::Path;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), WizardError> {
    let store = load_store(&settings.database, settings.backend)?;
    let controller = WizardController::new().with_link_base(settings.edit_link_base.clone());

    let mut state = AppState::new(store, controller);
    if settings.backend == BackendKind::File {
        state = state.with_snapshot(settings.database.clone());
    }

    println!("formstep Application Wizard Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", settings.host);
    println!("  Port:     {}", settings.port);
    println!("  Backend:  {}", settings.backend);
    println!("  Database: {}", settings.database.display());
    println!();
    println!("Endpoints:");
    println!("  POST /application                - Start a new application");
    println!("  POST /application/{{id}}/edit      - Edit a saved application");
    println!("  GET  /application/{{id}}           - Show a saved application");
    println!("  GET  /applications               - List saved applications");
    println!("  GET  /wizard/{{session}}           - Current wizard step");
    println!("  POST /wizard/{{session}}/navigate  - next / previous / jump / submit");
    println!("  DELETE /wizard/{{session}}         - Abandon a session");
    println!("  GET  /health                     - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&settings.bind_addr(), state, &HttpSettings::from(settings)).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), WizardError> {
    let path = &settings.database;
    if path.exists() {
        if !force {
            return Err(WizardError::Config(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path)
            .map_err(|e| WizardError::Io(format!("Remove {}: {}", path.display(), e)))?;
    }

    match settings.backend {
        BackendKind::Redb => {
            let _store = StorageBackend::with_redb(path)?;
            println!("Initialized new redb database at {}", path.display());
        }
        BackendKind::File => {
            save_store(&StorageBackend::default(), path)?;
            println!("Initialized new file database at {}", path.display());
        }
    }

    Ok(())
}

// =============================================================================
// LIST / SHOW COMMANDS
// =============================================================================

/// List saved applications.
pub fn cmd_list(settings: &Settings, json_mode: bool) -> Result<(), WizardError> {
    let store = load_store(&settings.database, settings.backend)?;
    let records = store.list()?;

    if json_mode {
        let output: Vec<RecordJson> = records.iter().map(RecordJson::from).collect();
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    if records.is_empty() {
        println!("No saved applications in {}", settings.database.display());
        return Ok(());
    }

    println!("{:>6}  {:>8}  Title", "Id", "Owner");
    for record in &records {
        println!(
            "{:>6}  {:>8}  {}",
            record.id().map(|id| id.to_string()).unwrap_or_default(),
            record.owner().map(|u| u.0.to_string()).unwrap_or_default(),
            record.title().unwrap_or("-")
        );
    }
    println!();
    println!("{} application(s)", records.len());

    Ok(())
}

/// Show a saved application, labelled the way the review step shows it.
pub fn cmd_show(settings: &Settings, json_mode: bool, id: u64) -> Result<(), WizardError> {
    let store = load_store(&settings.database, settings.backend)?;
    let record = store.load(RecordId(id))?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&RecordJson::from(&record)).unwrap_or_default()
        );
        return Ok(());
    }

    print!("{}", describe_record(&record));
    Ok(())
}

/// Text rendering of a saved record.
pub fn describe_record(record: &Record) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Application {}\n",
        record.id().map(|id| id.to_string()).unwrap_or_else(|| "(draft)".to_string())
    ));
    out.push_str(&format!("Title: {}\n", record.title().unwrap_or("-")));
    out.push_str(&format!(
        "Owner: {}\n",
        record.owner().map(|u| u.0.to_string()).unwrap_or_else(|| "-".to_string())
    ));

    let review = WizardController::new()
        .registry()
        .resolve(StepId::Review)
        .populate_surface(record);
    for section in &review.sections {
        out.push_str(&format!("\n{}\n", section.title));
        for item in &section.items {
            out.push_str(&format!("  {}: {}\n", item.label, item.value));
        }
    }
    out
}

// =============================================================================
// TERMINAL WIZARD COMMANDS
// =============================================================================

/// Fill in a new application on stdin/stdout.
pub fn cmd_apply(settings: &Settings, json_mode: bool, user: &Account) -> Result<(), WizardError> {
    let mut store = load_store(&settings.database, settings.backend)?;
    let draft = store.new_draft(APPLICATION_BUNDLE);
    run_on_terminal(settings, json_mode, &mut store, draft, user)
}

/// Re-open a saved application on stdin/stdout.
pub fn cmd_edit(
    settings: &Settings,
    json_mode: bool,
    id: u64,
    user: &Account,
) -> Result<(), WizardError> {
    let mut store = load_store(&settings.database, settings.backend)?;
    let record = store.load(RecordId(id))?;
    run_on_terminal(settings, json_mode, &mut store, record, user)
}

fn run_on_terminal(
    settings: &Settings,
    json_mode: bool,
    store: &mut StorageBackend,
    record: Record,
    user: &Account,
) -> Result<(), WizardError> {
    let controller = WizardController::new().with_link_base(settings.edit_link_base.clone());
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout().lock();

    let exit = run_terminal_wizard(&controller, record, store, user, &mut input, &mut output)?;

    match exit {
        WizardExit::Submitted(result) => {
            save_store(store, &settings.database)?;
            if json_mode {
                println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
            }
            Ok(())
        }
        WizardExit::Cancelled => {
            tracing::info!("Wizard cancelled, nothing saved");
            Ok(())
        }
    }
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the store at `path` with the given backend.
///
/// A missing snapshot file means an empty store.
pub fn load_store(path: &Path, backend: BackendKind) -> Result<StorageBackend, WizardError> {
    match backend {
        BackendKind::Redb => StorageBackend::with_redb(path),
        BackendKind::File => {
            if !path.exists() {
                return Ok(StorageBackend::default());
            }

            let metadata = std::fs::metadata(path)
                .map_err(|e| WizardError::Io(format!("Cannot read file metadata: {}", e)))?;
            if metadata.len() > MAX_SNAPSHOT_SIZE as u64 {
                return Err(WizardError::Serialization(format!(
                    "File size {} bytes exceeds maximum allowed {} bytes",
                    metadata.len(),
                    MAX_SNAPSHOT_SIZE
                )));
            }

            let data = std::fs::read(path)
                .map_err(|e| WizardError::Io(format!("Read {}: {}", path.display(), e)))?;
            Ok(StorageBackend::InMemory(store_from_bytes(&data)?))
        }
    }
}

/// Write the store back to `path`.
///
/// redb commits on every write, so only the file backend has work to do.
/// The snapshot goes to a sibling temp file first and is renamed into place.
pub fn save_store(store: &StorageBackend, path: &Path) -> Result<(), WizardError> {
    let Some(memory) = store.memory() else {
        return Ok(());
    };

    let data = store_to_bytes(memory)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &data)
        .map_err(|e| WizardError::Io(format!("Write {}: {}", tmp.display(), e)))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| WizardError::Io(format!("Replace {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "Snapshot written");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use formstep_core::steps::{FIRST_NAME, TELEPHONE};

    #[test]
    fn missing_snapshot_is_an_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = load_store(&dir.path().join("none.fstp"), BackendKind::File).expect("load");
        assert!(!store.is_persistent());
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn file_store_survives_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.fstp");

        let mut store = StorageBackend::default();
        let mut record = Record::draft(APPLICATION_BUNDLE);
        record.set(FIRST_NAME, "Jane");
        let id = store.save(&record).expect("save");
        save_store(&store, &path).expect("write");

        let reloaded = load_store(&path, BackendKind::File).expect("load");
        assert_eq!(reloaded.load(id).expect("record").get(FIRST_NAME), Some("Jane"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_snapshot_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("apps.fstp");
        std::fs::write(&path, b"not a snapshot").expect("write");

        assert!(matches!(
            load_store(&path, BackendKind::File),
            Err(WizardError::Serialization(_))
        ));
    }

    #[test]
    fn describe_uses_review_labels() {
        let mut record = Record::draft(APPLICATION_BUNDLE);
        record.set(TELEPHONE, "555-0100");
        record.set_title("jdoe");

        let text = describe_record(&record);
        assert!(text.contains("Application (draft)"));
        assert!(text.contains("Title: jdoe"));
        assert!(text.contains("Contact Details"));
        assert!(text.contains("  Telephone: 555-0100"));
    }
}
