//! services/dashboard/src/config.rs
//!
//! Defines the application's configuration structure and loading logic, and
//! the credential store backing every DocRouter request.
//!
//! Startup configuration (log level, environment defaults, file locations)
//! is loaded from environment variables; the `.env` file is used for local
//! development. Credential overrides saved from the settings surface are
//! persisted to a small JSON file and layered over the environment defaults
//! at read time, so a save is visible to the very next request without any
//! re-initialization.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::Level;

/// Endpoint used when neither a saved override nor an environment default
/// names an API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://app.docrouter.ai/fastapi";

/// A custom error type for configuration loading and persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,
    #[error("Failed to read the credentials file {path}: {source}")]
    ReadCredentials { path: PathBuf, source: io::Error },
    #[error("Failed to write the credentials file {path}: {source}")]
    WriteCredentials { path: PathBuf, source: io::Error },
    #[error("The credentials file {path} is not valid JSON: {source}")]
    MalformedCredentials {
        path: PathBuf,
        source: serde_json::Error,
    },
}

//=========================================================================================
// Startup Configuration
//=========================================================================================

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub credentials_path: PathBuf,
    pub credential_defaults: CredentialDefaults,
}

/// Environment defaults for the three credential fields. They take effect
/// only when no persisted override exists for the field.
#[derive(Clone, Debug, Default)]
pub struct CredentialDefaults {
    pub api_token: String,
    pub organization_id: String,
    pub api_base_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let credentials_path = match std::env::var("GRADING_ASSISTANT_CREDENTIALS") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_credentials_path()?,
        };

        let credential_defaults = CredentialDefaults {
            api_token: std::env::var("DOCROUTER_API_TOKEN").unwrap_or_default(),
            organization_id: std::env::var("DOCROUTER_ORG_ID").unwrap_or_default(),
            api_base_url: std::env::var("DOCROUTER_API_BASE_URL").unwrap_or_default(),
        };

        Ok(Self {
            log_level,
            credentials_path,
            credential_defaults,
        })
    }
}

/// Resolves the platform location for the persisted credentials file.
fn default_credentials_path() -> Result<PathBuf, ConfigError> {
    let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    path.push("grading-assistant");
    path.push("credentials.json");
    Ok(path)
}

//=========================================================================================
// Persisted Credential Overrides
//=========================================================================================

/// The on-disk shape of saved credential overrides. Keys match the names the
/// browser build of the dashboard used, so nothing needs migrating. An
/// absent key deserializes to an empty string, which reads as "no override".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PersistedOverrides {
    #[serde(rename = "docrouter_token", default)]
    token: String,
    #[serde(rename = "docrouter_org_id", default)]
    org_id: String,
    #[serde(rename = "docrouter_api_base_url", default)]
    api_base_url: String,
}

/// Which link of the precedence chain produced a resolved credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// A value saved from the settings surface.
    Override,
    /// An environment default.
    Environment,
    /// The hardcoded fallback (API base URL only).
    Default,
    /// Nothing configured anywhere; the value is empty.
    Unset,
}

/// A credential value together with the chain link that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub value: String,
    pub source: CredentialSource,
}

//=========================================================================================
// SettingsStore
//=========================================================================================

/// The process-wide credential store, shared via `Arc` with the request
/// dispatcher and the domain stores.
///
/// Every getter resolves override -> environment default -> hardcoded
/// default (base URL only) -> empty, at read time. Setters persist
/// unconditionally; saving an empty string clears the override so the next
/// read falls through to the environment default.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    defaults: CredentialDefaults,
    overrides: RwLock<PersistedOverrides>,
}

impl SettingsStore {
    /// Opens the store, loading persisted overrides when the file exists.
    /// A missing file is not an error; it means no overrides were saved yet.
    pub fn open(
        path: impl Into<PathBuf>,
        defaults: CredentialDefaults,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        let overrides = match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| {
                    ConfigError::MalformedCredentials {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => PersistedOverrides::default(),
            Err(source) => {
                return Err(ConfigError::ReadCredentials {
                    path: path.clone(),
                    source,
                })
            }
        };
        Ok(Self {
            path,
            defaults,
            overrides: RwLock::new(overrides),
        })
    }

    // --- Read side. Getters never fail; they resolve to a value (possibly
    // --- empty) through the precedence chain.

    pub fn api_token(&self) -> String {
        self.resolved_api_token().value
    }

    pub fn organization_id(&self) -> String {
        self.resolved_organization_id().value
    }

    pub fn api_base_url(&self) -> String {
        self.resolved_api_base_url().value
    }

    pub fn resolved_api_token(&self) -> ResolvedCredential {
        let overrides = self.read_overrides();
        resolve(&overrides.token, &self.defaults.api_token, None)
    }

    pub fn resolved_organization_id(&self) -> ResolvedCredential {
        let overrides = self.read_overrides();
        resolve(&overrides.org_id, &self.defaults.organization_id, None)
    }

    pub fn resolved_api_base_url(&self) -> ResolvedCredential {
        let overrides = self.read_overrides();
        resolve(
            &overrides.api_base_url,
            &self.defaults.api_base_url,
            Some(DEFAULT_API_BASE_URL),
        )
    }

    // --- Write side. Each setter persists synchronously before returning,
    // --- so a save survives a process restart.

    pub fn set_api_token(&self, value: &str) -> Result<(), ConfigError> {
        self.update(|o| o.token = value.to_string())
    }

    pub fn set_organization_id(&self, value: &str) -> Result<(), ConfigError> {
        self.update(|o| o.org_id = value.to_string())
    }

    pub fn set_api_base_url(&self, value: &str) -> Result<(), ConfigError> {
        self.update(|o| o.api_base_url = value.to_string())
    }

    fn read_overrides(&self) -> PersistedOverrides {
        // Writers replace fields wholesale, so a poisoned lock still holds
        // consistent data.
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, mutate: impl FnOnce(&mut PersistedOverrides)) -> Result<(), ConfigError> {
        let mut overrides = self
            .overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        mutate(&mut overrides);
        self.persist(&overrides)
    }

    fn persist(&self, overrides: &PersistedOverrides) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteCredentials {
                path: self.path.clone(),
                source,
            })?;
        }
        let bytes =
            serde_json::to_vec_pretty(overrides).map_err(|e| ConfigError::WriteCredentials {
                path: self.path.clone(),
                source: e.into(),
            })?;
        fs::write(&self.path, bytes).map_err(|source| ConfigError::WriteCredentials {
            path: self.path.clone(),
            source,
        })
    }
}

/// Resolves one credential through the precedence chain:
/// override -> environment default -> optional hardcoded fallback -> empty.
fn resolve(
    override_value: &str,
    default_value: &str,
    fallback: Option<&'static str>,
) -> ResolvedCredential {
    if !override_value.is_empty() {
        return ResolvedCredential {
            value: override_value.to_string(),
            source: CredentialSource::Override,
        };
    }
    if !default_value.is_empty() {
        return ResolvedCredential {
            value: default_value.to_string(),
            source: CredentialSource::Environment,
        };
    }
    if let Some(value) = fallback {
        return ResolvedCredential {
            value: value.to_string(),
            source: CredentialSource::Default,
        };
    }
    ResolvedCredential {
        value: String::new(),
        source: CredentialSource::Unset,
    }
}
