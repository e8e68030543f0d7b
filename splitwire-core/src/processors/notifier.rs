//! Push notification dispatch.
//!
//! [`PushNotifier`] is the queue consumer: it receives [`NotifyEvent`] items,
//! re-fetches the stored event, and hands it to the
//! [`NotificationDispatcher`], which derives the recipient set, acquires one
//! bearer credential per dispatch, and fans out one delivery task per
//! recipient. Recipient failures are isolated: each is logged on its own and
//! never cancels a sibling or reaches the caller that appended the event.

use crate::entities::event_records::{EventRecord, GetEventRecordById};
use crate::entities::group_records::ListGroupMemberIds;
use crate::entities::user_records::GetUserDeviceToken;
use crate::events::payloads::{EventPayload, ExpensePayload, GroupUserJoinedPayload, PayloadError};
use crate::events::{NotifyEvent, NotifyEventReceiver};
use crate::framework::DatabaseProcessor;
use crate::push::credentials::{AccessToken, CredentialError, TokenSource};
use crate::push::gateway::{PushMessage, PushSender};
use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Errors that abort a whole dispatch (as opposed to one recipient's delivery).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Recipient derivation hit the database and failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The stored payload does not match its event type's schema.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// No bearer credential could be derived; zero deliveries were attempted.
    #[error("credential acquisition failed: {0}")]
    Credential(#[from] CredentialError),
}

/// Per-recipient outcome counts for one dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Lookups the dispatcher needs about users and groups.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// The recipient's registered push destination token. `None` when the
    /// user is unknown or has not registered a device — a non-error skip.
    async fn device_token(&self, user_id: &str) -> Result<Option<String>, sqlx::Error>;

    /// Current member ids of a group.
    async fn group_member_ids(&self, group_id: &str) -> Result<Vec<String>, sqlx::Error>;
}

/// [`RecipientDirectory`] backed by the shared connection pool.
pub struct PgRecipientDirectory {
    pool: PgPool,
}

impl PgRecipientDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn device_token(&self, user_id: &str) -> Result<Option<String>, sqlx::Error> {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        let token = processor
            .process(GetUserDeviceToken {
                user_id: user_id.to_string(),
            })
            .await?;
        Ok(token.flatten())
    }

    async fn group_member_ids(&self, group_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        processor
            .process(ListGroupMemberIds {
                group_id: group_id.to_string(),
            })
            .await
    }
}

enum DeliveryOutcome {
    Sent,
    Skipped,
    Failed(String),
}

/// Computes recipients for one event and fans out push deliveries.
pub struct NotificationDispatcher<D, T, P> {
    directory: Arc<D>,
    tokens: Arc<T>,
    push: Arc<P>,
}

impl<D, T, P> NotificationDispatcher<D, T, P>
where
    D: RecipientDirectory + 'static,
    T: TokenSource + 'static,
    P: PushSender + 'static,
{
    pub fn new(directory: D, tokens: T, push: P) -> Self {
        Self {
            directory: Arc::new(directory),
            tokens: Arc::new(tokens),
            push: Arc::new(push),
        }
    }

    /// Dispatch pushes for one stored event.
    ///
    /// Waits for every delivery task before returning. Errors returned here
    /// abort the whole dispatch; individual delivery failures only count
    /// toward the summary.
    pub async fn dispatch(&self, event: &EventRecord) -> Result<DispatchSummary, DispatchError> {
        let payload = EventPayload::decode(event.event_type, &event.payload)?;

        let Some((recipients, message)) = self.plan(event, &payload).await? else {
            debug!(
                event_id = %event.event_id,
                event_type = ?event.event_type,
                "Event type does not notify, nothing to dispatch"
            );
            return Ok(DispatchSummary::default());
        };

        if recipients.is_empty() {
            debug!(event_id = %event.event_id, "No recipients for event");
            return Ok(DispatchSummary::default());
        }

        // One credential per dispatch; without it no recipient can be tried.
        let token = self.tokens.fetch_token().await?;

        let mut tasks = JoinSet::new();
        for user_id in recipients {
            let directory = Arc::clone(&self.directory);
            let push = Arc::clone(&self.push);
            let token = token.clone();
            let message = message.clone();
            tasks.spawn(async move {
                let outcome = deliver(&*directory, &*push, &token, &message, &user_id).await;
                (user_id, outcome)
            });
        }

        let mut summary = DispatchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((user_id, DeliveryOutcome::Sent)) => {
                    summary.sent += 1;
                    debug!(user_id = %user_id, "Push delivered");
                }
                Ok((user_id, DeliveryOutcome::Skipped)) => {
                    summary.skipped += 1;
                    debug!(user_id = %user_id, "Recipient has no registered device, skipping");
                }
                Ok((user_id, DeliveryOutcome::Failed(error))) => {
                    summary.failed += 1;
                    warn!(user_id = %user_id, error = %error, "Push delivery failed");
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(error = %e, "Push delivery task failed to run");
                }
            }
        }

        Ok(summary)
    }

    /// Recipient set and message for a notifiable event, `None` otherwise.
    async fn plan(
        &self,
        event: &EventRecord,
        payload: &EventPayload,
    ) -> Result<Option<(Vec<String>, PushMessage)>, DispatchError> {
        let plan = match payload {
            EventPayload::ExpenseCreated(expense) => Some((
                expense.recipients(),
                expense_message("New Expense Added", event, expense),
            )),
            EventPayload::ExpenseUpdated(expense) => Some((
                expense.recipients(),
                expense_message("Expense Updated", event, expense),
            )),
            EventPayload::GroupUserJoined(joined) => {
                let recipients = self.joined_group_recipients(event, joined).await?;
                Some((recipients, joined_message(event, joined)))
            }
            _ => None,
        };
        Ok(plan)
    }

    /// Everyone already in the group hears about a join; the joiner does not.
    async fn joined_group_recipients(
        &self,
        event: &EventRecord,
        joined: &GroupUserJoinedPayload,
    ) -> Result<Vec<String>, DispatchError> {
        let members = self.directory.group_member_ids(&event.group_id).await?;
        Ok(members
            .into_iter()
            .filter(|member| member != &joined.user_id)
            .collect())
    }
}

async fn deliver<D, P>(
    directory: &D,
    push: &P,
    token: &AccessToken,
    message: &PushMessage,
    user_id: &str,
) -> DeliveryOutcome
where
    D: RecipientDirectory + ?Sized,
    P: PushSender + ?Sized,
{
    let device_token = match directory.device_token(user_id).await {
        Ok(token) => token,
        Err(e) => return DeliveryOutcome::Failed(format!("device token lookup failed: {e}")),
    };

    let Some(device_token) = device_token.filter(|t| !t.is_empty()) else {
        return DeliveryOutcome::Skipped;
    };

    match push.send(token, &device_token, message).await {
        Ok(()) => DeliveryOutcome::Sent,
        Err(e) => DeliveryOutcome::Failed(e.to_string()),
    }
}

fn event_data(event: &EventRecord) -> HashMap<String, String> {
    HashMap::from([
        ("event_id".to_string(), event.event_id.clone()),
        ("group_id".to_string(), event.group_id.clone()),
        ("event_type".to_string(), event.event_type.as_str().to_string()),
    ])
}

fn expense_message(title: &str, event: &EventRecord, expense: &ExpensePayload) -> PushMessage {
    PushMessage {
        title: title.to_string(),
        body: format!(
            "{} - {} - {}",
            expense.description, expense.currency, expense.total
        ),
        data: event_data(event),
    }
}

fn joined_message(event: &EventRecord, joined: &GroupUserJoinedPayload) -> PushMessage {
    PushMessage {
        title: "New Group Member".to_string(),
        body: format!("{} joined the group", joined.name),
        data: event_data(event),
    }
}

/// Queue consumer: drives the dispatcher from the notify channel.
pub struct PushNotifier<D, T, P> {
    pool: PgPool,
    dispatcher: NotificationDispatcher<D, T, P>,
    notify_rx: NotifyEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl<D, T, P> PushNotifier<D, T, P>
where
    D: RecipientDirectory + 'static,
    T: TokenSource + 'static,
    P: PushSender + 'static,
{
    pub fn new(
        pool: PgPool,
        dispatcher: NotificationDispatcher<D, T, P>,
        notify_rx: NotifyEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            notify_rx,
            shutdown_rx,
        }
    }

    /// Run until shutdown is signaled or the channel closes.
    pub async fn run(mut self) {
        info!("PushNotifier started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("PushNotifier received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.notify_rx.recv() => {
                    debug!(event_id = %event.event_id, "Received NotifyEvent");
                    self.process_event(event).await;
                }

                else => {
                    info!("NotifyEvent channel closed");
                    break;
                }
            }
        }

        // Drain whatever was queued before the shutdown signal landed.
        while let Ok(event) = self.notify_rx.try_recv() {
            self.process_event(event).await;
        }

        info!("PushNotifier shutdown complete");
    }

    async fn process_event(&self, event: NotifyEvent) {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };

        let record = match processor
            .process(GetEventRecordById {
                event_id: event.event_id.clone(),
            })
            .await
        {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(event_id = %event.event_id, "Event vanished before dispatch");
                return;
            }
            Err(e) => {
                error!(event_id = %event.event_id, error = %e, "Failed to load event for dispatch");
                return;
            }
        };

        // Dispatch faults stop here; the append that queued us already returned.
        match self.dispatcher.dispatch(&record).await {
            Ok(summary) => {
                info!(
                    event_id = %record.event_id,
                    sent = summary.sent,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Dispatch complete"
                );
            }
            Err(e) => {
                error!(event_id = %record.event_id, error = %e, "Dispatch aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EventType;
    use crate::push::gateway::PushError;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use time::macros::datetime;

    struct StaticDirectory {
        tokens: HashMap<String, Option<String>>,
        members: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl RecipientDirectory for StaticDirectory {
        async fn device_token(&self, user_id: &str) -> Result<Option<String>, sqlx::Error> {
            Ok(self.tokens.get(user_id).cloned().flatten())
        }

        async fn group_member_ids(&self, group_id: &str) -> Result<Vec<String>, sqlx::Error> {
            Ok(self.members.get(group_id).cloned().unwrap_or_default())
        }
    }

    struct StaticTokenSource {
        fail: bool,
        calls: AtomicUsize,
    }

    impl StaticTokenSource {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenSource for StaticTokenSource {
        async fn fetch_token(&self) -> Result<AccessToken, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CredentialError::NotConfigured)
            } else {
                Ok(AccessToken::new("test-token".into()))
            }
        }
    }

    struct RecordingPushSender {
        calls: Arc<Mutex<Vec<String>>>,
        fail_tokens: HashSet<String>,
    }

    #[async_trait]
    impl PushSender for RecordingPushSender {
        async fn send(
            &self,
            _token: &AccessToken,
            device_token: &str,
            _message: &PushMessage,
        ) -> Result<(), PushError> {
            self.calls.lock().unwrap().push(device_token.to_string());
            if self.fail_tokens.contains(device_token) {
                Err(PushError::Gateway {
                    status: 404,
                    body: "UNREGISTERED".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn event(event_type: EventType, payload: serde_json::Value) -> EventRecord {
        EventRecord {
            event_id: "evt-1".into(),
            linked_event_id: None,
            group_id: "g1".into(),
            user_id: "author".into(),
            event_type,
            payload,
            created_at: datetime!(2026-03-01 12:00),
        }
    }

    fn expense_payload(paid_by: &[&str], paid_for: &[&str]) -> serde_json::Value {
        let share = |id: &&str| json!({"user_id": id, "amount": "10.00"});
        json!({
            "description": "Groceries",
            "date_time": "2026-03-01T12:00:00Z",
            "split_type": "equal",
            "currency": "EUR",
            "total": "20.00",
            "paid_by": paid_by.iter().map(share).collect::<Vec<_>>(),
            "paid_for": paid_for.iter().map(share).collect::<Vec<_>>(),
        })
    }

    fn dispatcher(
        tokens: HashMap<String, Option<String>>,
        members: HashMap<String, Vec<String>>,
        token_source: StaticTokenSource,
        fail_tokens: HashSet<String>,
    ) -> (
        NotificationDispatcher<StaticDirectory, StaticTokenSource, RecordingPushSender>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = NotificationDispatcher::new(
            StaticDirectory { tokens, members },
            token_source,
            RecordingPushSender {
                calls: Arc::clone(&calls),
                fail_tokens,
            },
        );
        (dispatcher, calls)
    }

    #[tokio::test]
    async fn payer_listed_as_payee_gets_one_attempt() {
        let (dispatcher, calls) = dispatcher(
            HashMap::from([("u1".to_string(), Some("tok-1".to_string()))]),
            HashMap::new(),
            StaticTokenSource::ok(),
            HashSet::new(),
        );

        let event = event(EventType::ExpenseCreated, expense_payload(&["u1"], &["u1"]));
        let summary = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(calls.lock().unwrap().as_slice(), ["tok-1"]);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn failing_recipient_does_not_stop_siblings() {
        let (dispatcher, calls) = dispatcher(
            HashMap::from([
                ("u1".to_string(), Some("tok-bad".to_string())),
                ("u2".to_string(), Some("tok-ok".to_string())),
            ]),
            HashMap::new(),
            StaticTokenSource::ok(),
            HashSet::from(["tok-bad".to_string()]),
        );

        let event = event(
            EventType::ExpenseCreated,
            expense_payload(&["u1"], &["u2"]),
        );
        let summary = dispatcher.dispatch(&event).await.unwrap();

        let mut attempted = calls.lock().unwrap().clone();
        attempted.sort();
        assert_eq!(attempted, ["tok-bad", "tok-ok"]);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn recipient_without_device_is_skipped_without_error() {
        let (dispatcher, calls) = dispatcher(
            HashMap::from([
                ("u1".to_string(), None),
                ("u2".to_string(), Some("tok-2".to_string())),
            ]),
            HashMap::new(),
            StaticTokenSource::ok(),
            HashSet::new(),
        );

        let event = event(
            EventType::ExpenseCreated,
            expense_payload(&["u1"], &["u2"]),
        );
        let summary = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(calls.lock().unwrap().as_slice(), ["tok-2"]);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn credential_failure_short_circuits_the_batch() {
        let (dispatcher, calls) = dispatcher(
            HashMap::from([
                ("u1".to_string(), Some("tok-1".to_string())),
                ("u2".to_string(), Some("tok-2".to_string())),
            ]),
            HashMap::new(),
            StaticTokenSource::failing(),
            HashSet::new(),
        );

        let event = event(
            EventType::ExpenseCreated,
            expense_payload(&["u1"], &["u2"]),
        );
        let err = dispatcher.dispatch(&event).await.unwrap_err();

        assert!(matches!(err, DispatchError::Credential(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_a_typed_local_error() {
        let (dispatcher, calls) = dispatcher(
            HashMap::new(),
            HashMap::new(),
            StaticTokenSource::ok(),
            HashSet::new(),
        );

        let event = event(EventType::ExpenseCreated, json!({"whoops": true}));
        let err = dispatcher.dispatch(&event).await.unwrap_err();

        assert!(matches!(err, DispatchError::Payload(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn group_join_notifies_existing_members_not_the_joiner() {
        let (dispatcher, calls) = dispatcher(
            HashMap::from([
                ("a".to_string(), Some("tok-a".to_string())),
                ("b".to_string(), Some("tok-b".to_string())),
                ("joiner".to_string(), Some("tok-joiner".to_string())),
            ]),
            HashMap::from([(
                "g1".to_string(),
                vec!["a".to_string(), "b".to_string(), "joiner".to_string()],
            )]),
            StaticTokenSource::ok(),
            HashSet::new(),
        );

        let event = event(
            EventType::GroupUserJoined,
            json!({
                "name": "Dana",
                "user_id": "joiner",
                "date_time": "2026-03-02T08:30:00Z"
            }),
        );
        let summary = dispatcher.dispatch(&event).await.unwrap();

        let mut attempted = calls.lock().unwrap().clone();
        attempted.sort();
        assert_eq!(attempted, ["tok-a", "tok-b"]);
        assert_eq!(summary.sent, 2);
    }

    #[tokio::test]
    async fn ledger_only_event_fetches_no_credential() {
        let (dispatcher, calls) = dispatcher(
            HashMap::new(),
            HashMap::new(),
            StaticTokenSource::ok(),
            HashSet::new(),
        );
        let token_calls = Arc::clone(&dispatcher.tokens);

        let event = event(
            EventType::GroupCreated,
            json!({"name": "Trip", "date_time": "2026-03-01T12:00:00Z"}),
        );
        let summary = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(token_calls.calls.load(Ordering::SeqCst), 0);
    }
}
