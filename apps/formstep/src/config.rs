//! # Configuration
//!
//! Resolves runtime settings from four layers, highest first:
//!
//! 1. CLI flags
//! 2. Environment (`FORMSTEP_*`)
//! 3. TOML config file (`formstep.toml` or `--config <path>`)
//! 4. Built-in defaults
//!
//! ## Config file
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100
//! cors_origins = "http://localhost:3000"
//! edit_link_base = "https://apply.example.org"
//!
//! [storage]
//! database = "formstep.db"
//! backend = "redb"
//! ```
//!
//! ## Environment
//!
//! `FORMSTEP_HOST`, `FORMSTEP_PORT`, `FORMSTEP_RATE_LIMIT`,
//! `FORMSTEP_CORS_ORIGINS`, `FORMSTEP_EDIT_LINK_BASE`, `FORMSTEP_DATABASE`,
//! `FORMSTEP_BACKEND`, `FORMSTEP_API_KEY`. The API key is only read from the
//! environment so it never lands in a checked-in file.

use formstep_core::WizardError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "formstep.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RATE_LIMIT: u32 = 100;
const DEFAULT_DATABASE: &str = "formstep.db";

// =============================================================================
// STORAGE BACKEND KIND
// =============================================================================

/// Which storage backend the binary runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Postcard snapshot file. The server rewrites it after each submission
    /// and each abandoned session; in-progress sessions are lost on restart.
    File,
    /// ACID redb database.
    #[default]
    Redb,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Redb => "redb",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            other => Err(WizardError::Config(format!(
                "Unknown backend '{}' (expected \"file\" or \"redb\")",
                other
            ))),
        }
    }
}

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Contents of `formstep.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub rate_limit: Option<u32>,
    pub cors_origins: Option<String>,
    pub edit_link_base: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub database: Option<PathBuf>,
    pub backend: Option<String>,
}

impl FileConfig {
    /// Parse a config file body.
    pub fn from_toml_str(source: &str) -> Result<Self, WizardError> {
        toml::from_str(source).map_err(|e| WizardError::Config(format!("Invalid config: {}", e)))
    }

    /// Read a config file from disk.
    pub fn read(path: &Path) -> Result<Self, WizardError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            WizardError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(WizardError::Config(format!(
                "Config file {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            WizardError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Load the explicit config file, or `formstep.toml` if it exists.
    ///
    /// An explicit path must exist; the implicit one is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, WizardError> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "Loading config file");
                    Self::read(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub backend: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database: PathBuf,
    pub backend: BackendKind,
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    pub cors_origins: Option<String>,
    pub edit_link_base: String,
    pub api_key: Option<String>,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn resolve(overrides: &Overrides, file: &FileConfig) -> Result<Self, WizardError> {
        Self::resolve_with(overrides, file, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(
        overrides: &Overrides,
        file: &FileConfig,
        env: F,
    ) -> Result<Self, WizardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let database = overrides
            .database
            .clone()
            .or_else(|| env("FORMSTEP_DATABASE").map(PathBuf::from))
            .or_else(|| file.storage.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let backend = match overrides
            .backend
            .clone()
            .or_else(|| env("FORMSTEP_BACKEND"))
            .or_else(|| file.storage.backend.clone())
        {
            Some(raw) => raw.parse()?,
            None => BackendKind::default(),
        };

        let host = overrides
            .host
            .clone()
            .or_else(|| env("FORMSTEP_HOST"))
            .or_else(|| file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match env("FORMSTEP_PORT") {
                Some(raw) => parse_number("FORMSTEP_PORT", &raw)?,
                None => file.server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let rate_limit = match env("FORMSTEP_RATE_LIMIT") {
            Some(raw) => parse_number("FORMSTEP_RATE_LIMIT", &raw)?,
            None => file.server.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT),
        };

        let cors_origins = env("FORMSTEP_CORS_ORIGINS").or_else(|| file.server.cors_origins.clone());

        let edit_link_base = env("FORMSTEP_EDIT_LINK_BASE")
            .or_else(|| file.server.edit_link_base.clone())
            .unwrap_or_default();

        Ok(Self {
            database,
            backend,
            host,
            port,
            rate_limit,
            cors_origins,
            edit_link_base,
            api_key: env("FORMSTEP_API_KEY"),
        })
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, WizardError> {
    raw.trim()
        .parse()
        .map_err(|_| WizardError::Config(format!("{} is not a valid number: '{}'", key, raw)))
}

// =============================================================================
// TESTS
// =============================================================================
