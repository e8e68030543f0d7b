//! Channel factory and handles for the notification queue.

use super::types::NotifyEvent;
use tokio::sync::mpsc;

/// Default buffer size for the notify channel.
///
/// Enough to absorb bursts of appends while keeping memory bounded; a full
/// buffer back-pressures the append handler's `send().await`.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for NotifyEvent items.
pub type NotifyEventSender = mpsc::Sender<NotifyEvent>;
/// Receiver handle for NotifyEvent items.
pub type NotifyEventReceiver = mpsc::Receiver<NotifyEvent>;

/// Create the notify channel.
///
/// Multiple senders can be cloned from the returned sender; the single
/// receiver belongs to the `PushNotifier` task.
pub fn notify_event_channel() -> (NotifyEventSender, NotifyEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
