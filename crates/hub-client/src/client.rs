//! The production HTTP implementation of [`SigningService`].

use async_trait::async_trait;
use hub_sign_primitives::hub::{SignRequest, TxRecord};
use tracing::{debug, warn};

use crate::{errors::HubClientError, SigningService};

/// Path of the transaction-registration endpoint, relative to the hub's base
/// URL.
const TRANSACTIONS_PATH: &str = "/transactions";

/// HTTP client for the signing hub's REST interface.
#[derive(Debug, Clone)]
pub struct HttpHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpHubClient {
    /// Creates a client for the hub at `base_url`, e.g.
    /// `https://api.superblocks.com/v1`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client that reuses an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn transactions_url(&self) -> String {
        format!("{}{}", self.base_url, TRANSACTIONS_PATH)
    }
}

#[async_trait]
impl SigningService for HttpHubClient {
    async fn register_transaction(&self, request: SignRequest) -> Result<TxRecord, HubClientError> {
        let url = self.transactions_url();
        debug!(%url, method = %request.rpc_payload.method, "registering transaction with the hub");

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body);
            warn!(status = status.as_u16(), %message, "hub rejected transaction registration");
            return Err(HubClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let record = response.json::<TxRecord>().await?;
        debug!(id = %record.id, job_id = %record.job_id, "hub accepted transaction");
        Ok(record)
    }
}

/// Extracts the hub's human-readable `message` from an error body, falling
/// back to the raw body (or a placeholder) when it is not the expected JSON
/// shape.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "(no error message)".to_owned()
            } else {
                body.to_owned()
            }
        })
}
