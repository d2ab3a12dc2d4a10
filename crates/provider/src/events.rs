//! Lifecycle events emitted by the correlation engine.
//!
//! These are a side-effecting observation channel only, suitable for driving
//! a progress indicator or structured audit log. Subscribing to them never
//! alters correlation semantics.

/// A notable point in the life of a signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The request is about to be registered with the hub.
    Submitted {
        /// The RPC method being signed.
        method: String,
    },

    /// The hub accepted the request and assigned it to a signing job.
    Registered {
        /// Hub-assigned transaction id.
        id: String,

        /// Hub-assigned signing job id.
        job_id: String,
    },

    /// A completion notification matched the pending request.
    Matched {
        /// Hub-assigned transaction id.
        id: String,

        /// The resulting transaction hash.
        transaction_hash: String,
    },

    /// The signing flow failed or was abandoned.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
}
