//! This module provides the constant values used throughout the crate.

/// Namespace prefix of the hub's notification channels.
pub const CHANNEL_NAMESPACE: &str = "web3-hub";

/// The event kind carrying transaction-status updates.
pub const UPDATE_TRANSACTION_EVENT: &str = "update_transaction";

/// The RPC methods that require the signer's key material and are therefore
/// redirected to the hub instead of the node endpoint.
pub const SIGNING_METHODS: [&str; 2] = ["eth_sendTransaction", "eth_sign"];

/// Returns the notification channel scoped to `job_id`.
pub fn job_channel(job_id: &str) -> String {
    format!("{CHANNEL_NAMESPACE}-{job_id}")
}
