//! Notification queue types for the dispatch pipeline.
//!
//! A ledger append that stores a notifiable event enqueues a [`NotifyEvent`]
//! onto a bounded channel consumed by the `PushNotifier` processor. Queue
//! items are idempotent and ephemeral — they carry the event id, and the
//! processor re-fetches the durably committed row before dispatching. The
//! append path never waits for delivery.

pub mod channels;
pub mod payloads;
pub mod types;

pub use channels::{
    notify_event_channel, NotifyEventReceiver, NotifyEventSender, DEFAULT_CHANNEL_BUFFER,
};
pub use payloads::{EventPayload, ExpensePayload, ExpenseShare, PayloadError};
pub use types::NotifyEvent;
