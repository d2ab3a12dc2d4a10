//! Wire types for the signing hub's REST interface and its notification
//! payloads.

use serde::{Deserialize, Serialize};

use crate::{context::JobContext, rpc::JsonRpcRequest};

/// The body of a transaction-registration request sent to the signing hub.
///
/// Field names follow the hub's camelCase wire format. The CI identifiers are
/// optional; when absent they are omitted from the serialized body entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// The build configuration the signing job belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_config_id: Option<String>,

    /// The CI job that originated the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_job_id: Option<String>,

    /// The project the signing job belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// The target network identifier.
    pub network_id: String,

    /// The checksummed address of the configured signer.
    pub from: String,

    /// The original RPC payload, forwarded to the hub untouched.
    pub rpc_payload: JsonRpcRequest,
}

impl SignRequest {
    /// Assembles a registration request from the ambient job context and the
    /// per-call fields.
    pub fn new(
        context: &JobContext,
        network_id: &str,
        from: &str,
        rpc_payload: JsonRpcRequest,
    ) -> Self {
        Self {
            build_config_id: context.build_config_id.clone(),
            ci_job_id: context.ci_job_id.clone(),
            project_id: context.project_id.clone(),
            network_id: network_id.to_owned(),
            from: from.to_owned(),
            rpc_payload,
        }
    }
}

/// The record returned by the hub when it accepts a transaction for signing.
///
/// `id` is the correlation key for the pending request; `job_id` scopes the
/// notification channel on which the completion event will arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    /// Hub-assigned identifier of the registered transaction.
    pub id: String,

    /// Hub-assigned identifier of the signing job.
    pub job_id: String,
}

/// A transaction-status record decoded from an `update_transaction`
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatusUpdate {
    /// Hub-assigned identifier of the transaction the update refers to.
    pub id: String,

    /// The hash of the signed and submitted transaction.
    pub transaction_hash: String,
}
