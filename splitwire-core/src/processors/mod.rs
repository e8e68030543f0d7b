pub mod notifier;

pub use notifier::{
    DispatchError, DispatchSummary, NotificationDispatcher, PgRecipientDirectory, PushNotifier,
    RecipientDirectory,
};
