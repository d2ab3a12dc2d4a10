//! The RPC dispatcher, the public entry point of this crate.

use std::sync::Arc;

use hub_client::SigningService;
use hub_notify::{client::HubNotifyClient, subscription::Subscription};
use hub_sign_primitives::{
    context::JobContext,
    rpc::{JsonRpcRequest, JsonRpcResponse},
};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    config::ProviderConfig,
    constants::SIGNING_METHODS,
    correlator::TxCorrelator,
    errors::{ConfigError, ProviderError, SignFlowError},
    events::LifecycleEvent,
};

/// A web3 provider that forwards ordinary RPC calls to a node endpoint and
/// redirects signing calls to the hub for manual approval.
///
/// Classification is by exact, case-sensitive method name:
///
/// - `eth_accounts` is answered locally from the configured signer address,
/// - `eth_sendTransaction` and `eth_sign` go through the correlation engine,
/// - everything else is forwarded verbatim to the configured endpoint.
///
/// Cloning is cheap; clones share the correlation engine.
#[derive(Debug, Clone)]
pub struct HubSignProvider {
    config: ProviderConfig,
    correlator: TxCorrelator,
    http: reqwest::Client,
}

impl HubSignProvider {
    /// Creates a provider, validating `config` first and sourcing the CI job
    /// context from the environment.
    ///
    /// Construction fails on an invalid config, so no provider instance can
    /// exist without having passed validation.
    pub fn new(
        config: ProviderConfig,
        hub: Arc<dyn SigningService>,
        notify: HubNotifyClient,
    ) -> Result<Self, ConfigError> {
        Self::with_job_context(config, JobContext::from_env(), hub, notify)
    }

    /// Creates a provider with an explicitly supplied CI job context.
    pub fn with_job_context(
        config: ProviderConfig,
        job_context: JobContext,
        hub: Arc<dyn SigningService>,
        notify: HubNotifyClient,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let correlator = TxCorrelator::new(
            hub,
            notify,
            job_context,
            config.from.clone(),
            config.sign_timeout,
        );
        Ok(Self {
            config,
            correlator,
            http: reqwest::Client::new(),
        })
    }

    /// The accounts this provider can sign for: always exactly the
    /// configured signer address.
    pub fn accounts(&self) -> Vec<String> {
        vec![self.config.from.clone()]
    }

    /// Returns the account address at `index`, mirroring the historical
    /// provider surface.
    pub fn address(&self, index: usize) -> Option<String> {
        self.accounts().into_iter().nth(index)
    }

    /// Dispatches a JSON-RPC payload and resolves to its response envelope.
    ///
    /// For signing methods this suspends until the hub reports the signed
    /// transaction, which can take as long as a human needs to approve it.
    pub async fn dispatch(&self, payload: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError> {
        match payload.method.as_str() {
            "eth_accounts" => {
                // Answered locally; no I/O of any kind.
                Ok(JsonRpcResponse::result(&payload, json!(self.accounts())))
            }
            method if SIGNING_METHODS.contains(&method) => {
                let transaction_hash = self
                    .correlator
                    .submit_and_await(payload.clone(), &self.config.network_id)
                    .await?;
                Ok(JsonRpcResponse::result(
                    &payload,
                    Value::String(transaction_hash),
                ))
            }
            _ => self.forward(payload).await,
        }
    }

    /// Callback-style variant of [`Self::dispatch`] for the historical
    /// provider API shape.
    ///
    /// The callback is invoked exactly once, with either the error or the
    /// response, from a spawned task; the caller is never blocked.
    pub fn dispatch_with_callback<F>(&self, payload: JsonRpcRequest, callback: F)
    where
        F: FnOnce(Result<JsonRpcResponse, ProviderError>) + Send + 'static,
    {
        let provider = self.clone();
        tokio::task::spawn(async move {
            callback(provider.dispatch(payload).await);
        });
    }

    /// Abandons a pending signing request by its hub-assigned id (as
    /// reported by [`LifecycleEvent::Registered`]), settling the waiting
    /// call with [`SignFlowError::Cancelled`].
    pub fn cancel_sign_request(&self, id: &str) -> Result<(), SignFlowError> {
        self.correlator.cancel(id)
    }

    /// Returns the number of signing requests currently awaiting the hub's
    /// completion notification.
    pub async fn pending_sign_requests(&self) -> usize {
        self.correlator.pending_requests().await
    }

    /// Creates a stream of [`LifecycleEvent`]s, e.g. to drive a progress
    /// indicator while a transaction waits for approval.
    pub async fn subscribe_lifecycle(&self) -> Subscription<LifecycleEvent> {
        self.correlator.subscribe_lifecycle().await
    }

    /// Methods that need no account information are offloaded to the
    /// configured node endpoint (Infura, a custom node, etc.) unchanged.
    async fn forward(&self, payload: JsonRpcRequest) -> Result<JsonRpcResponse, ProviderError> {
        debug!(method = %payload.method, endpoint = %self.config.endpoint, "forwarding to node");
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;
        Ok(response.json::<JsonRpcResponse>().await?)
    }
}
