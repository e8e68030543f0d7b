//! TOML file configuration structures.
//!
//! These structs directly map to the `splitwire-config.toml` file format.

use serde::{Deserialize, Serialize};
use splitwire_core::push::{FIREBASE_MESSAGING_SCOPE, GOOGLE_TOKEN_URL};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerSection,
    pub admin: AdminSection,
    /// Push delivery settings. When absent the server runs with
    /// notifications disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushSection>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSection {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Push delivery configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSection {
    /// Path to the service-account key JSON file
    /// (`client_email` + `private_key`).
    pub service_account_file: PathBuf,
    /// Gateway send endpoint for the project, e.g.
    /// `https://fcm.googleapis.com/v1/projects/<project>/messages:send`.
    pub gateway_url: String,
    /// Token exchange endpoint of the identity provider.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// OAuth scope requested for the exchanged token.
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn default_scope() -> String {
    FIREBASE_MESSAGING_SCOPE.to_string()
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[push]
service_account_file = "/etc/splitwire/service-account.json"
gateway_url = "https://fcm.googleapis.com/v1/projects/demo/messages:send"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert!(!config.is_admin_secret_hashed());

        let push = config.push.unwrap();
        assert_eq!(push.token_url, GOOGLE_TOKEN_URL);
        assert_eq!(push.scope, FIREBASE_MESSAGING_SCOPE);
        assert_eq!(
            push.gateway_url,
            "https://fcm.googleapis.com/v1/projects/demo/messages:send"
        );
    }

    #[test]
    fn test_push_section_is_optional() {
        let toml_str = r#"
[server]
listen = "0.0.0.0:8080"

[admin]
secret = "s3cret"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.push.is_none());
    }

    #[test]
    fn test_hashed_secret_detection() {
        let config = FileConfig {
            server: ServerSection {
                listen: default_listen_addr(),
            },
            admin: AdminSection {
                secret: "$argon2id$v=19$m=19456,t=2,p=1$abc123".to_string(),
            },
            push: None,
        };
        assert!(config.is_admin_secret_hashed());
    }
}
