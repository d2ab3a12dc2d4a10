//! Error types for the hub client.

use thiserror::Error;

/// Errors surfaced when talking to the signing hub.
#[derive(Debug, Error)]
pub enum HubClientError {
    /// The HTTP request itself failed (connection, TLS, decode).
    #[error("hub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The hub refused the transaction registration. The message is the
    /// hub's own human-readable description of the failure.
    #[error("hub rejected the transaction: {message}")]
    Rejected {
        /// The HTTP status code returned by the hub.
        status: u16,

        /// The hub's human-readable error message.
        message: String,
    },
}
