/// Queue item asking the notifier to dispatch pushes for one stored event.
///
/// Carries only the id; the notifier re-fetches current state from the ledger,
/// so a stale or duplicate queue item is harmless.
#[derive(Debug, Clone)]
pub struct NotifyEvent {
    pub event_id: String,
}
