//! # formstep HTTP API Module
//!
//! JSON API over the application wizard, built on axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /application` - Start a new application (new session)
//! - `GET /applications` - List saved applications
//! - `GET /application/{id}` - Show a saved application
//! - `POST /application/{id}/edit` - Re-open a saved application (new session)
//! - `GET /wizard/{session}` - Current surface of a session
//! - `POST /wizard/{session}/navigate` - Apply next/previous/jump/submit
//! - `DELETE /wizard/{session}` - Abandon a session without saving
//!
//! The acting user is taken from `X-User-Id` / `X-User-Name`.
//!
//! ## Security Configuration
//!
//! - `cors_origins`: comma-separated allowed origins, or "*" (default: localhost only)
//! - `rate_limit`: requests per second (default: 100, 0 to disable)
//! - `FORMSTEP_API_KEY`: if set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{ApiKey, keys_match};
pub use handlers::{
    USER_ID_HEADER, USER_NAME_HEADER, abandon_handler, create_application_handler,
    edit_application_handler, get_application_handler, health_handler, list_applications_handler,
    navigate_handler, wizard_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    HealthResponse, NavigateRequest, RecordJson, RecordListResponse, RecordResponse,
    WizardResponse,
};

use crate::config::Settings;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use formstep_core::{StorageBackend, WizardController, WizardError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit (1 MB).
const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the store and the wizard controller.
#[derive(Clone)]
pub struct AppState {
    /// Records and wizard sessions.
    pub store: Arc<RwLock<StorageBackend>>,
    pub controller: WizardController,
    /// Snapshot file rewritten after each submission (file backend only).
    pub snapshot: Option<PathBuf>,
}

impl AppState {
    #[must_use]
    pub fn new(store: StorageBackend, controller: WizardController) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            controller,
            snapshot: None,
        }
    }

    /// Persist the in-memory store to `path` after every submission.
    #[must_use]
    pub fn with_snapshot(mut self, path: PathBuf) -> Self {
        self.snapshot = Some(path);
        self
    }
}

// =============================================================================
// HTTP SETTINGS
// =============================================================================

/// The router-level subset of [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    pub rate_limit: u32,
    pub cors_origins: Option<String>,
    pub api_key: Option<String>,
}

impl From<&Settings> for HttpSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            rate_limit: settings.rate_limit,
            cors_origins: settings.cors_origins.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

fn allowed_headers() -> [HeaderName; 4] {
    [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        HeaderName::from_static(USER_ID_HEADER),
        HeaderName::from_static(USER_NAME_HEADER),
    ]
}

/// Build the CORS layer.
///
/// - `"*"`: allow all origins (development only)
/// - unset: localhost only
/// - otherwise: comma-separated list of origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (cors_origins=*). This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers(allowed_headers())
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(allowed_headers())
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if an API key is configured)
pub fn create_router(state: AppState, settings: &HttpSettings) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/applications", get(handlers::list_applications_handler))
        .route("/application", post(handlers::create_application_handler))
        .route("/application/{id}", get(handlers::get_application_handler))
        .route(
            "/application/{id}/edit",
            post(handlers::edit_application_handler),
        )
        .route(
            "/wizard/{session}",
            get(handlers::wizard_handler).delete(handlers::abandon_handler),
        )
        .route(
            "/wizard/{session}/navigate",
            post(handlers::navigate_handler),
        );

    match settings.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let key: ApiKey = Arc::from(key);
            router = router.layer(axum_middleware::from_fn_with_state(
                key,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set FORMSTEP_API_KEY to enable authentication."
            );
        }
    }

    match create_rate_limiter(settings.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", settings.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(settings.cors_origins.as_deref()))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState, settings: &HttpSettings) -> Result<(), WizardError> {
    let router = create_router(state, settings);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WizardError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("formstep HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WizardError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
