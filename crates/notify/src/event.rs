//! Event types delivered over notification channels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single event as it appears on the wire and as it is delivered to
/// subscribers.
///
/// The payload is kept opaque here; decoding it into a domain type is the
/// subscriber's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// The channel the event was published on.
    pub channel: String,

    /// The event kind, e.g. `update_transaction`.
    #[serde(rename = "eventName")]
    pub event: String,

    /// The opaque message payload.
    #[serde(rename = "message")]
    pub payload: Value,
}

impl ChannelEvent {
    /// Convenience constructor.
    pub fn new(channel: &str, event: &str, payload: Value) -> Self {
        Self {
            channel: channel.to_owned(),
            event: event.to_owned(),
            payload,
        }
    }
}
