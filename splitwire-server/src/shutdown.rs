//! Process shutdown plumbing.
//!
//! Two halves: a future that resolves on SIGTERM/SIGINT (handed to axum's
//! graceful shutdown), and the watch channel main uses to tell the notifier
//! task to drain and exit once the server has stopped accepting requests.

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

/// Watch channel carrying the "shut down now" flag for background tasks.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolves when the process is asked to terminate.
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    tracing::info!(signal = received, "Shutdown signal received, draining");
}
