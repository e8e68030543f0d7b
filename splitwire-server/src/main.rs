//! Splitwire server: event ledger and push notification service for a
//! multi-user shared-expense application.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use splitwire_core::events::{NotifyEventReceiver, notify_event_channel};
use splitwire_core::processors::{NotificationDispatcher, PgRecipientDirectory, PushNotifier};
use splitwire_core::push::{PushGateway, ServiceAccountTokenSource};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Splitwire - shared-expense event ledger with push notifications
#[derive(Parser, Debug)]
#[command(name = "splitwire-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./splitwire-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    tracing::info!("splitwire-server v{} starting", env!("CARGO_PKG_VERSION"));

    let runtime_config = ConfigLoader::new(&args.config, args.listen)
        .load()
        .map_err(|e| {
            tracing::error!(config = ?args.config, error = %e, "Could not load configuration");
            e
        })?;
    let listen_addr = runtime_config.server.listen;
    let runtime_config = Arc::new(runtime_config);
    tracing::info!(config = ?args.config, "Configuration loaded");

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&get_database_url()?)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Could not connect to database");
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        sqlx::migrate!("../migrations").run(&db_pool).await?;
        tracing::info!("Database migrations applied");
    }

    // The notifier consumes the queue on its own task with its own shutdown
    // flag, so cancelling an HTTP request can never cancel an in-flight
    // dispatch.
    let (notify_tx, notify_rx) = notify_event_channel();
    let (shutdown_tx, shutdown_rx) = shutdown::shutdown_channel();

    let notifier_handle = match &runtime_config.push {
        Some(push) => {
            let dispatcher = NotificationDispatcher::new(
                PgRecipientDirectory::new(db_pool.clone()),
                ServiceAccountTokenSource::new(
                    push.service_account.clone(),
                    push.token_url.clone(),
                    push.scope.clone(),
                ),
                PushGateway::new(push.gateway_url.clone()),
            );
            let notifier = PushNotifier::new(db_pool.clone(), dispatcher, notify_rx, shutdown_rx);
            tokio::spawn(notifier.run())
        }
        None => {
            tracing::warn!("No [push] configuration found, notifications will not be sent");
            tokio::spawn(discard_notifications(notify_rx, shutdown_rx))
        }
    };

    let state = AppState::new(db_pool.clone(), runtime_config, notify_tx);
    let router = build_router(state);

    tracing::info!(%listen_addr, "Starting HTTP server");
    let result = run_server(router, listen_addr).await;

    // Requests have stopped; tell the notifier to drain its queue and wait
    // for it before dropping the pool.
    let _ = shutdown_tx.send(true);
    if let Err(e) = notifier_handle.await {
        tracing::error!(error = %e, "Notifier task failed");
    }

    db_pool.close().await;
    tracing::info!("Shutdown complete");

    result.map_err(Into::into)
}

/// Queue consumer used when push is not configured: appends still succeed,
/// queued notifications are logged and dropped.
async fn discard_notifications(
    mut notify_rx: NotifyEventReceiver,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }

            Some(event) = notify_rx.recv() => {
                tracing::debug!(event_id = %event.event_id, "Push disabled, discarding notification");
            }

            else => break,
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
