//! Push delivery: credential acquisition and the gateway client.
//!
//! Both halves sit behind traits ([`TokenSource`], [`PushSender`]) so the
//! dispatcher can be exercised without the network.

pub mod credentials;
pub mod gateway;

pub use credentials::{
    AccessToken, CredentialError, ServiceAccountKey, ServiceAccountTokenSource, TokenSource,
    FIREBASE_MESSAGING_SCOPE, GOOGLE_TOKEN_URL,
};
pub use gateway::{PushError, PushGateway, PushMessage, PushSender};
