//! Push gateway client.
//!
//! Delivers exactly one notification message to exactly one destination token
//! per call, authorized by a bearer credential. Failures are classified as
//! transport or gateway (non-2xx, body captured) and reported to the caller;
//! nothing is retried here.

use crate::push::credentials::AccessToken;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Bounded timeout for one delivery call.
const SEND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Notification content: title, body, and opaque key/value data for the
/// client application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// Errors that can occur during push delivery.
#[derive(Debug, Error)]
pub enum PushError {
    /// Network or timeout failure before a status was received.
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("push gateway returned status {status}: {body}")]
    Gateway { status: u16, body: String },
}

/// Delivers one message to one destination token.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        token: &AccessToken,
        device_token: &str,
        message: &PushMessage,
    ) -> Result<(), PushError>;
}

// FCM v1 wire format: {"message": {"token", "notification": {"title", "body"}, "data"?}}

#[derive(Debug, Serialize)]
struct MessageEnvelope {
    message: GatewayMessage,
}

#[derive(Debug, Serialize)]
struct GatewayMessage {
    token: String,
    notification: GatewayNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize)]
struct GatewayNotification {
    title: String,
    body: String,
}

fn envelope(device_token: &str, message: &PushMessage) -> MessageEnvelope {
    MessageEnvelope {
        message: GatewayMessage {
            token: device_token.to_string(),
            notification: GatewayNotification {
                title: message.title.clone(),
                body: message.body.clone(),
            },
            data: if message.data.is_empty() {
                None
            } else {
                Some(message.data.clone())
            },
        },
    }
}

/// HTTPS [`PushSender`] for the configured gateway endpoint.
pub struct PushGateway {
    endpoint: String,
    http_client: reqwest::Client,
}

impl PushGateway {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl PushSender for PushGateway {
    async fn send(
        &self,
        token: &AccessToken,
        device_token: &str,
        message: &PushMessage,
    ) -> Result<(), PushError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token.expose()))
            .json(&envelope(device_token, message))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(PushError::Gateway {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_matches_gateway_wire_format() {
        let message = PushMessage {
            title: "New Expense Added".into(),
            body: "Groceries - EUR - 42.50".into(),
            data: HashMap::from([("group_id".to_string(), "g1".to_string())]),
        };
        let body = serde_json::to_value(envelope("device-123", &message)).unwrap();
        assert_eq!(
            body,
            json!({
                "message": {
                    "token": "device-123",
                    "notification": {
                        "title": "New Expense Added",
                        "body": "Groceries - EUR - 42.50"
                    },
                    "data": {"group_id": "g1"}
                }
            })
        );
    }

    #[test]
    fn empty_data_is_omitted_from_the_wire() {
        let message = PushMessage {
            title: "t".into(),
            body: "b".into(),
            data: HashMap::new(),
        };
        let body = serde_json::to_value(envelope("d", &message)).unwrap();
        assert!(body["message"].get("data").is_none());
    }
}
