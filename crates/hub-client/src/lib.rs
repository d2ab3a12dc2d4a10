//! REST client for the signing hub.
//!
//! The hub exposes a single operation relevant here: registering a
//! transaction for manual signing. The [`SigningService`] trait captures that
//! operation so that the correlation engine can be exercised against mock
//! services in tests; [`client::HttpHubClient`] is the production
//! implementation.

pub mod client;
mod errors;

use async_trait::async_trait;
pub use errors::HubClientError;
use hub_sign_primitives::hub::{SignRequest, TxRecord};

/// The hub operation that registers a transaction for manual signing.
///
/// On success the hub returns a [`TxRecord`] whose `id` is the correlation
/// key for the pending request and whose `job_id` scopes the notification
/// channel the completion event will be published on.
#[async_trait]
pub trait SigningService: Send + Sync {
    /// Registers `request` with the hub and returns the assigned record.
    ///
    /// Implementations must not retry; a failure is surfaced to the caller
    /// as-is.
    async fn register_transaction(&self, request: SignRequest) -> Result<TxRecord, HubClientError>;
}
