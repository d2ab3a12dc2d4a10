//! Error types for the notification client.

use thiserror::Error;

/// Errors surfaced by [`crate::client::HubNotifyClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// The wire stream has terminated, so no further events can be delivered
    /// and new subscriptions would never fire.
    #[error("notification transport disconnected")]
    Disconnected,
}
