//! Validated runtime configuration, immutable after startup.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use splitwire_core::push::ServiceAccountKey;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub push: Option<PushConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Admin authentication material. Only the argon2 hash is kept in memory.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    secret_hash: String,
}

impl AdminConfig {
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Verify a presented plaintext secret against the stored hash.
    pub fn verify(&self, presented: &str) -> bool {
        let Ok(hash) = PasswordHash::new(&self.secret_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(presented.as_bytes(), &hash)
            .is_ok()
    }
}

/// Push delivery configuration with the loaded service-account key.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub service_account: ServiceAccountKey,
    pub gateway_url: String,
    pub token_url: String,
    pub scope: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hash_secret;

    #[test]
    fn verify_accepts_the_hashed_secret_and_nothing_else() {
        let hash = hash_secret("hunter2").unwrap();
        let admin = AdminConfig::new(hash);

        assert!(admin.verify("hunter2"));
        assert!(!admin.verify("hunter3"));
        assert!(!admin.verify(""));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let admin = AdminConfig::new("not-a-phc-string".to_string());
        assert!(!admin.verify("anything"));
    }
}
