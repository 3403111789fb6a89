//! # API Endpoint Handlers
//!
//! Each handler takes the store lock once, drives the synchronous wizard
//! controller and writes the session back before releasing it.

use super::{
    AppState,
    types::{
        HealthResponse, NavigateRequest, RecordListResponse, RecordResponse, WizardResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use formstep_core::{
    Account, Action, NavigationOutcome, Record, RecordId, RecordStore, SessionStore, SessionToken,
    StorageBackend, WizardController, WizardError, WizardSessionState, WizardSurface,
    primitives::{APPLICATION_BUNDLE, MAX_TITLE_LENGTH},
};

/// Header carrying the acting user's numeric id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the acting user's display name.
pub const USER_NAME_HEADER: &str = "x-user-name";

// =============================================================================
// ERROR MAPPING
// =============================================================================

fn status_for(err: &WizardError) -> StatusCode {
    match err {
        WizardError::RecordNotFound(_) | WizardError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        WizardError::InvalidAction { .. }
        | WizardError::UnknownStep(_)
        | WizardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        WizardError::MissingRecord | WizardError::IdentityConflict { .. } => StatusCode::CONFLICT,
        WizardError::Storage(_)
        | WizardError::Serialization(_)
        | WizardError::Io(_)
        | WizardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn wizard_reply(result: Result<WizardResponse, WizardError>) -> (StatusCode, Json<WizardResponse>) {
    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Wizard request failed");
            } else {
                tracing::debug!(error = %e, "Wizard request rejected");
            }
            (status, Json(WizardResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// ACTING USER
// =============================================================================

/// Read the acting user from the request headers.
///
/// Missing headers mean the anonymous user.
pub fn acting_user(headers: &HeaderMap) -> Result<Account, WizardError> {
    let mut account = Account::anonymous();
    if let Some(raw) = header_text(headers, USER_ID_HEADER)? {
        account.id.0 = raw.trim().parse().map_err(|_| {
            WizardError::InvalidInput(format!("{} must be a number", USER_ID_HEADER))
        })?;
    }
    if let Some(name) = header_text(headers, USER_NAME_HEADER)? {
        let name = name.trim();
        if name.len() > MAX_TITLE_LENGTH {
            return Err(WizardError::InvalidInput(format!(
                "{} exceeds maximum {} bytes",
                USER_NAME_HEADER, MAX_TITLE_LENGTH
            )));
        }
        if !name.is_empty() {
            account.name = name.to_string();
        }
    }
    Ok(account)
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, WizardError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| WizardError::InvalidInput(format!("{} is not valid text", name)))
        })
        .transpose()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// ENTRY HANDLERS
// =============================================================================

/// Open a new session on `record` and start the wizard in it.
fn open_wizard(
    controller: &WizardController,
    store: &mut StorageBackend,
    record: Record,
) -> Result<(SessionToken, WizardSurface), WizardError> {
    let token = store.open_session()?;
    let mut session = WizardSessionState::new();
    let surface = controller.start(&mut session, Some(record))?;
    store.store_session(token, &session)?;

    tracing::debug!(session = %token, step = %surface.step, "Wizard session opened");
    Ok((token, surface))
}

/// Start a new application.
pub async fn create_application_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut store = state.store.write().await;
    let draft = store.new_draft(APPLICATION_BUNDLE);

    wizard_reply(
        open_wizard(&state.controller, &mut store, draft)
            .map(|(token, surface)| WizardResponse::surface(token, surface)),
    )
}

/// Re-open a saved application; the wizard starts on review.
pub async fn edit_application_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;

    let result = store
        .load(RecordId(id))
        .and_then(|record| open_wizard(&state.controller, &mut store, record))
        .map(|(token, surface)| WizardResponse::surface(token, surface));

    wizard_reply(result)
}

// =============================================================================
// RECORD HANDLERS
// =============================================================================

/// Show a saved application.
pub async fn get_application_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.load(RecordId(id)) {
        Ok(record) => (StatusCode::OK, Json(RecordResponse::found(&record))),
        Err(e) => (status_for(&e), Json(RecordResponse::error(e.to_string()))),
    }
}

/// List saved applications.
pub async fn list_applications_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.list() {
        Ok(records) => (StatusCode::OK, Json(RecordListResponse::list(&records))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RecordListResponse::error(format!("List failed: {}", e))),
        ),
    }
}

// =============================================================================
// WIZARD HANDLERS
// =============================================================================

/// Current surface of a session (page reload).
pub async fn wizard_handler(
    State(state): State<AppState>,
    Path(session): Path<u64>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;
    wizard_reply(reload(&state.controller, &mut store, SessionToken(session)))
}

fn reload(
    controller: &WizardController,
    store: &mut StorageBackend,
    token: SessionToken,
) -> Result<WizardResponse, WizardError> {
    let mut session = store.require_session(token)?;
    let record = session.record().cloned();
    let surface = controller.start(&mut session, record)?;
    store.store_session(token, &session)?;
    Ok(WizardResponse::surface(token, surface))
}

/// Apply one navigation event to a session.
pub async fn navigate_handler(
    State(state): State<AppState>,
    Path(session): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<NavigateRequest>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;
    wizard_reply(navigate(
        &state,
        &mut store,
        SessionToken(session),
        &headers,
        &request,
    ))
}

fn navigate(
    state: &AppState,
    store: &mut StorageBackend,
    token: SessionToken,
    headers: &HeaderMap,
    request: &NavigateRequest,
) -> Result<WizardResponse, WizardError> {
    request.validate()?;
    let user = acting_user(headers)?;
    let mut session = store.require_session(token)?;

    // A file-backed submission only counts once the snapshot is on disk.
    let rollback = match &state.snapshot {
        Some(_) if request.action == Action::Submit => store.memory().cloned(),
        _ => None,
    };

    let outcome = state.controller.handle_navigation(
        &mut session,
        request.action,
        &request.values,
        &mut store.closing(token),
        &user,
    )?;

    match outcome {
        NavigationOutcome::Surface(surface) => {
            store.store_session(token, &session)?;
            Ok(WizardResponse::surface(token, surface))
        }
        NavigationOutcome::Submitted(result) => {
            if let Some(path) = &state.snapshot
                && let Err(e) = crate::cli::save_store(store, path)
            {
                if let Some(previous) = rollback {
                    *store = StorageBackend::InMemory(previous);
                }
                return Err(WizardError::Storage(format!(
                    "Application not saved, snapshot write failed: {}",
                    e
                )));
            }
            Ok(WizardResponse::submitted(result))
        }
    }
}

/// Abandon a session. Nothing is saved.
pub async fn abandon_handler(
    State(state): State<AppState>,
    Path(session): Path<u64>,
) -> impl IntoResponse {
    let mut store = state.store.write().await;
    wizard_reply(abandon(&state, &mut store, SessionToken(session)))
}

fn abandon(
    state: &AppState,
    store: &mut StorageBackend,
    token: SessionToken,
) -> Result<WizardResponse, WizardError> {
    let session = store.require_session(token)?;
    store.remove_session(token)?;

    if let Some(path) = &state.snapshot
        && let Err(e) = crate::cli::save_store(store, path)
    {
        store.store_session(token, &session)?;
        return Err(e);
    }

    tracing::debug!(session = %token, "Wizard session abandoned");
    Ok(WizardResponse::abandoned(token))
}

// =============================================================================
// TESTS
// =============================================================================
