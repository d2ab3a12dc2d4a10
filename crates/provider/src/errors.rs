//! Error types for the provider.

use hub_client::HubClientError;
use hub_notify::NotifyError;
use thiserror::Error;

/// Errors raised when validating a [`crate::config::ProviderConfig`].
///
/// A provider cannot be constructed while any of these hold, so no I/O is
/// ever attempted with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `from` address is missing or fails the EIP-55 checksum.
    #[error("the `from` property is required and must be a checksummed address, got: {0:?}")]
    InvalidFromAddress(String),

    /// The node endpoint is missing.
    #[error("the `endpoint` property is required and must be a non-empty URL")]
    MissingEndpoint,

    /// The network id is missing or not a positive integer.
    #[error("the `network_id` property is required and must be a positive integer, got: {0:?}")]
    InvalidNetworkId(String),
}

/// Errors raised by a signing flow, from registration through settlement.
#[derive(Debug, Error)]
pub enum SignFlowError {
    /// The hub rejected or failed to accept the transaction. No pending
    /// entry exists after this error and nothing is retried.
    #[error("transaction registration failed: {0}")]
    Registration(#[from] HubClientError),

    /// Subscribing to the job's notification channel failed. The pending
    /// entry created during registration has been removed.
    #[error("notification subscription failed: {0}")]
    Subscription(#[from] NotifyError),

    /// The correlation engine shut down before the request settled.
    #[error("signing flow aborted before settlement")]
    Aborted,

    /// The configured signing timeout elapsed. The pending entry and its
    /// subscription have been torn down.
    #[error("timed out waiting for the transaction to be signed")]
    TimedOut,

    /// The request was cancelled via [`crate::correlator::TxCorrelator::cancel`].
    #[error("signing request cancelled")]
    Cancelled,
}

/// Unified error type for everything that can fail in a dispatched call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A signing call failed.
    #[error("signing flow failed: {0}")]
    Sign(#[from] SignFlowError),

    /// Forwarding a passthrough call to the node endpoint failed. The
    /// underlying transport error is surfaced verbatim.
    #[error("passthrough request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
