//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_*` environment variables and an
//! optional configuration file, in that order of precedence, layered over the
//! built-in defaults. Accessors fall back to the same defaults for settings
//! built in code, and [`UsersSettings::validate`] turns them into typed
//! settings.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::firestore::FirestoreConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:7000";
const DEFAULT_MOUNT_PATH: &str = "/users";
const DEFAULT_STORE: &str = "memory";
const DEFAULT_FIRESTORE_PROJECT: &str = "telescope";
const DEFAULT_FIRESTORE_COLLECTION: &str = "users";
const DEFAULT_FIRESTORE_TIMEOUT_SECS: u64 = 10;
const EMULATOR_HOST_VAR: &str = "FIRESTORE_EMULATOR_HOST";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The layered sources could not be merged.
    #[error("failed to load configuration: {message}")]
    Load { message: String },
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
    /// `mount_path` does not start with `/`.
    #[error("mount path must start with '/': {value:?}")]
    InvalidMountPath { value: String },
    /// `store` names an unknown backend.
    #[error("unknown store backend {value:?}; expected \"memory\" or \"firestore\"")]
    UnknownStore { value: String },
    /// A required Firestore setting is blank.
    #[error("firestore store requires a non-empty {field}")]
    MissingFirestoreSetting { field: &'static str },
    /// The Firestore timeout is zero.
    #[error("firestore timeout must be at least one second")]
    ZeroTimeout,
}

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local map; contents are lost on restart.
    #[default]
    Memory,
    /// Firestore REST API or its emulator.
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            _ => Err(ConfigError::UnknownStore {
                value: value.to_owned(),
            }),
        }
    }
}

/// Raw configuration values for the users service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct UsersSettings {
    /// Socket address the HTTP server binds to.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: Option<String>,
    /// Path prefix the users resource is mounted under.
    #[ortho_config(default = String::from(DEFAULT_MOUNT_PATH))]
    pub mount_path: Option<String>,
    /// Storage backend: `memory` or `firestore`.
    #[ortho_config(default = String::from(DEFAULT_STORE))]
    pub store: Option<String>,
    /// Google Cloud project holding the Firestore database.
    #[ortho_config(default = String::from(DEFAULT_FIRESTORE_PROJECT))]
    pub firestore_project: Option<String>,
    /// Firestore collection holding user documents.
    #[ortho_config(default = String::from(DEFAULT_FIRESTORE_COLLECTION))]
    pub firestore_collection: Option<String>,
    /// `host:port` of a Firestore emulator.
    pub firestore_emulator_host: Option<String>,
    /// OAuth bearer token for Firestore requests.
    pub firestore_token: Option<String>,
    /// Per-request timeout for Firestore calls, in seconds.
    #[ortho_config(default = DEFAULT_FIRESTORE_TIMEOUT_SECS)]
    pub firestore_timeout_secs: Option<u64>,
}

/// Validated settings ready for server construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub bind_addr: SocketAddr,
    pub mount_path: String,
    pub store: StoreBackend,
    /// Present when `store` is [`StoreBackend::Firestore`].
    pub firestore: Option<FirestoreConfig>,
}

impl UsersSettings {
    /// Load settings from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when any source fails to parse.
    pub fn load_from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args).map_err(|err| ConfigError::Load {
            message: err.to_string(),
        })
    }

    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured mount path, falling back to the default.
    pub fn mount_path(&self) -> &str {
        self.mount_path.as_deref().unwrap_or(DEFAULT_MOUNT_PATH)
    }

    pub fn firestore_project(&self) -> &str {
        self.firestore_project
            .as_deref()
            .unwrap_or(DEFAULT_FIRESTORE_PROJECT)
    }

    pub fn firestore_collection(&self) -> &str {
        self.firestore_collection
            .as_deref()
            .unwrap_or(DEFAULT_FIRESTORE_COLLECTION)
    }

    /// Return the emulator host, falling back to `FIRESTORE_EMULATOR_HOST`.
    pub fn firestore_emulator_host(&self) -> Option<String> {
        self.firestore_emulator_host
            .clone()
            .or_else(|| std::env::var(EMULATOR_HOST_VAR).ok())
            .filter(|host| !host.trim().is_empty())
    }

    pub fn firestore_timeout(&self) -> Duration {
        Duration::from_secs(
            self.firestore_timeout_secs
                .unwrap_or(DEFAULT_FIRESTORE_TIMEOUT_SECS),
        )
    }

    /// Apply defaults and check every value.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<ServiceSettings, ConfigError> {
        let bind_addr = self
            .bind_addr()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBindAddr {
                value: self.bind_addr().to_owned(),
                reason: err.to_string(),
            })?;

        let mount_path = self.mount_path().trim_end_matches('/');
        if !self.mount_path().starts_with('/') {
            return Err(ConfigError::InvalidMountPath {
                value: self.mount_path().to_owned(),
            });
        }

        let store = self
            .store
            .as_deref()
            .map(StoreBackend::from_str)
            .transpose()?
            .unwrap_or_default();

        let firestore = match store {
            StoreBackend::Memory => None,
            StoreBackend::Firestore => Some(self.firestore_config()?),
        };

        Ok(ServiceSettings {
            bind_addr,
            mount_path: mount_path.to_owned(),
            store,
            firestore,
        })
    }

    fn firestore_config(&self) -> Result<FirestoreConfig, ConfigError> {
        let project = self.firestore_project().trim();
        if project.is_empty() {
            return Err(ConfigError::MissingFirestoreSetting {
                field: "firestore_project",
            });
        }
        let collection = self.firestore_collection().trim();
        if collection.is_empty() {
            return Err(ConfigError::MissingFirestoreSetting {
                field: "firestore_collection",
            });
        }
        let timeout = self.firestore_timeout();
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(FirestoreConfig {
            project: project.to_owned(),
            collection: collection.to_owned(),
            emulator_host: self.firestore_emulator_host(),
            token: self.firestore_token.clone(),
            timeout,
        })
    }
}
