//! Configuration module for splitwire-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables. Also handles admin secret hashing and loading the
//! push service-account key.

pub mod file;
pub mod runtime;

use crate::config::file::{FileConfig, PushSection};
use crate::config::runtime::{AdminConfig, PushConfig, RuntimeConfig, ServerConfig};
use splitwire_core::push::ServiceAccountKey;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("password hashing error: {0}")]
    Hash(String),

    #[error("failed to read service account key {path:?}: {source}")]
    ServiceAccountIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse service account key {path:?}: {source}")]
    ServiceAccountParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 5. Load the service-account key when push is configured
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;

        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = hash_secret(&file_config.admin.secret)?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        let push = file_config
            .push
            .as_ref()
            .map(|section| load_push_config(section))
            .transpose()?;

        Ok(RuntimeConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
            },
            admin: AdminConfig::new(secret_hash),
            push,
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.admin.secret.trim().is_empty() {
            return Err(ConfigError::Validation(
                "admin.secret must not be empty".to_string(),
            ));
        }
        if let Some(push) = &config.push {
            if push.gateway_url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "push.gateway_url must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn load_push_config(section: &PushSection) -> Result<PushConfig, ConfigError> {
    let raw = std::fs::read_to_string(&section.service_account_file).map_err(|source| {
        ConfigError::ServiceAccountIo {
            path: section.service_account_file.clone(),
            source,
        }
    })?;
    let service_account: ServiceAccountKey =
        serde_json::from_str(&raw).map_err(|source| ConfigError::ServiceAccountParse {
            path: section.service_account_file.clone(),
            source,
        })?;

    Ok(PushConfig {
        service_account,
        gateway_url: section.gateway_url.clone(),
        token_url: section.token_url.clone(),
        scope: section.scope.clone(),
    })
}

pub(crate) fn hash_secret(plaintext: &str) -> Result<String, ConfigError> {
    use argon2::{
        Argon2, PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConfigError::Hash(e.to_string()))
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
