//! Helpers for feeding notification events to a [`HubNotifyClient`] by hand.

use hub_notify::{client::HubNotifyClient, event::ChannelEvent};
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Creates a [`HubNotifyClient`] whose wire stream is driven by the returned
/// sender. Dropping the sender simulates the transport disconnecting.
pub fn wire_channel() -> (UnboundedSender<ChannelEvent>, HubNotifyClient) {
    let (wire_tx, wire_rx) = unbounded_channel();
    let client = HubNotifyClient::connect(UnboundedReceiverStream::new(wire_rx));
    (wire_tx, client)
}

/// Builds the `update_transaction` event the hub publishes when a signing
/// job completes, on the channel scoped to `job_id`.
pub fn update_transaction_event(job_id: &str, id: &str, transaction_hash: &str) -> ChannelEvent {
    ChannelEvent::new(
        &format!("web3-hub-{job_id}"),
        "update_transaction",
        json!({ "id": id, "transactionHash": transaction_hash }),
    )
}
