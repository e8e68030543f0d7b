//! Shared handler state.

use crate::config::runtime::RuntimeConfig;
use splitwire_core::events::NotifyEventSender;
use sqlx::PgPool;
use std::sync::Arc;

/// Everything a request handler can reach: the connection pool, the immutable
/// runtime configuration, and the sender half of the notification queue.
/// Cloned per request; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<RuntimeConfig>,
    pub notify_tx: NotifyEventSender,
}

impl AppState {
    pub fn new(db: PgPool, config: Arc<RuntimeConfig>, notify_tx: NotifyEventSender) -> Self {
        Self {
            db,
            config,
            notify_tx,
        }
    }
}
