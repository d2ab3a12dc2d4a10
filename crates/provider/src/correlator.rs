//! The pending-request correlator.
//!
//! This is the asynchronous completion-correlation engine: it owns the table
//! of in-flight signing requests and runs the subscribe → match → resolve →
//! unsubscribe protocol against the hub's notification channels. A single
//! driver task serializes every table mutation, so an insert racing a
//! notification can never double-settle an entry.

use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::{stream::SelectAll, FutureExt, StreamExt};
use hub_client::SigningService;
use hub_notify::{client::HubNotifyClient, event::ChannelEvent, subscription::Subscription};
use hub_sign_primitives::{
    context::JobContext,
    hub::{SignRequest, TxRecord, TxStatusUpdate},
    rpc::JsonRpcRequest,
};
use tokio::{
    select,
    sync::{
        mpsc::{unbounded_channel, UnboundedSender},
        oneshot, Mutex,
    },
    task::{self, JoinHandle},
    time,
};
use tracing::{debug, info, trace, warn};

use crate::{
    constants::{job_channel, UPDATE_TRANSACTION_EVENT},
    errors::SignFlowError,
    events::LifecycleEvent,
};

/// A signing request that has been registered with the hub and is waiting
/// for its completion notification.
///
/// The record is an immutable snapshot; it is only ever looked up and then
/// removed, never mutated in place.
#[derive(Debug)]
struct PendingSignRequest {
    /// Hub-assigned transaction id, also the key of the pending table.
    id: String,

    /// Hub-assigned signing job id, scoping the notification channel.
    job_id: String,

    /// The originating RPC request.
    request: JsonRpcRequest,

    /// Settles the waiting caller. Consumed on settlement, which makes
    /// settling inherently at-most-once.
    respond_on: oneshot::Sender<Result<String, SignFlowError>>,
}

enum CorrelatorMsg {
    Track {
        record: TxRecord,
        request: JsonRpcRequest,
        respond_on: oneshot::Sender<Result<String, SignFlowError>>,
    },
    Cancel {
        id: String,
    },
}

type PendingTable = Arc<Mutex<HashMap<String, PendingSignRequest>>>;
type Watchers = Arc<Mutex<Vec<UnboundedSender<LifecycleEvent>>>>;

/// Owns the pending-request table and correlates hub notifications back to
/// the callers awaiting them.
///
/// Cloning is cheap and all clones share the same driver task; the task is
/// aborted when the last clone is dropped.
#[derive(Clone)]
pub struct TxCorrelator {
    msg_tx: UnboundedSender<CorrelatorMsg>,
    pending: PendingTable,
    hub: Arc<dyn SigningService>,
    job_context: JobContext,
    from: String,
    sign_timeout: Option<Duration>,
    watchers: Watchers,
    driver: Arc<JoinHandle<()>>,
}

impl std::fmt::Debug for TxCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxCorrelator")
            .field("from", &self.from)
            .field("job_context", &self.job_context)
            .field("sign_timeout", &self.sign_timeout)
            .finish_non_exhaustive()
    }
}

impl Drop for TxCorrelator {
    fn drop(&mut self) {
        if Arc::strong_count(&self.driver) == 1 {
            self.driver.abort();
        }
    }
}

impl TxCorrelator {
    /// Creates a correlator and spawns its driver task.
    ///
    /// `from` is the configured signer address forwarded with every
    /// registration; `sign_timeout` bounds the wait for a completion
    /// notification (`None` waits indefinitely).
    pub fn new(
        hub: Arc<dyn SigningService>,
        notify: HubNotifyClient,
        job_context: JobContext,
        from: String,
        sign_timeout: Option<Duration>,
    ) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel::<CorrelatorMsg>();
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let watchers: Watchers = Arc::new(Mutex::new(Vec::new()));

        let pending_driver = pending.clone();
        let watchers_driver = watchers.clone();
        let driver = Arc::new(task::spawn(async move {
            let mut msgs = tokio_stream::wrappers::UnboundedReceiverStream::new(msg_rx);
            let mut active_subs = SelectAll::<Subscription<ChannelEvent>>::new();
            loop {
                select! {
                    Some(msg) = msgs.next().fuse() => match msg {
                        CorrelatorMsg::Track { record, request, respond_on } => {
                            track(
                                &pending_driver,
                                &watchers_driver,
                                &notify,
                                &mut active_subs,
                                record,
                                request,
                                respond_on,
                            )
                            .await;
                        }
                        CorrelatorMsg::Cancel { id } => {
                            if let Some(entry) = pending_driver.lock().await.remove(&id) {
                                notify.unsubscribe(&job_channel(&entry.job_id)).await;
                                emit(
                                    &watchers_driver,
                                    LifecycleEvent::Failed {
                                        reason: format!("request {id} cancelled"),
                                    },
                                )
                                .await;
                                let _ = entry.respond_on.send(Err(SignFlowError::Cancelled));
                            }
                        }
                    },
                    Some(event) = active_subs.next().fuse() => {
                        settle(&pending_driver, &watchers_driver, &notify, event).await;
                    }
                    else => break,
                }
            }
        }));

        Self {
            msg_tx,
            pending,
            hub,
            job_context,
            from,
            sign_timeout,
            watchers,
            driver,
        }
    }

    /// Registers `request` with the hub and waits for the matching
    /// completion notification, resolving to the transaction hash.
    ///
    /// A registration failure is surfaced immediately and leaves no pending
    /// entry behind; nothing is retried. With no configured timeout the wait
    /// is indefinite, ended only by the notification or by [`Self::cancel`].
    pub async fn submit_and_await(
        &self,
        request: JsonRpcRequest,
        network_id: &str,
    ) -> Result<String, SignFlowError> {
        emit(
            &self.watchers,
            LifecycleEvent::Submitted {
                method: request.method.clone(),
            },
        )
        .await;

        let sign_request = SignRequest::new(&self.job_context, network_id, &self.from, request.clone());
        let record = match self.hub.register_transaction(sign_request).await {
            Ok(record) => record,
            Err(err) => {
                emit(
                    &self.watchers,
                    LifecycleEvent::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
                return Err(SignFlowError::Registration(err));
            }
        };
        info!(id = %record.id, job_id = %record.job_id, "transaction registered with the hub");

        let (respond_on, settled) = oneshot::channel();
        self.msg_tx
            .send(CorrelatorMsg::Track {
                record: record.clone(),
                request,
                respond_on,
            })
            .map_err(|_| SignFlowError::Aborted)?;

        let outcome = match self.sign_timeout {
            Some(limit) => match time::timeout(limit, settled).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    // Tear down the entry and its subscription before
                    // reporting, so an expired wait leaks nothing.
                    let _ = self.msg_tx.send(CorrelatorMsg::Cancel {
                        id: record.id.clone(),
                    });
                    emit(
                        &self.watchers,
                        LifecycleEvent::Failed {
                            reason: format!("timed out waiting for job {}", record.job_id),
                        },
                    )
                    .await;
                    return Err(SignFlowError::TimedOut);
                }
            },
            None => settled.await,
        };
        outcome.map_err(|_| SignFlowError::Aborted)?
    }

    /// Abandons the pending request with the given hub-assigned id.
    ///
    /// The entry is removed, its channel unsubscribed, and the waiting
    /// caller settled with [`SignFlowError::Cancelled`]. Unknown ids are a
    /// no-op.
    pub fn cancel(&self, id: &str) -> Result<(), SignFlowError> {
        self.msg_tx
            .send(CorrelatorMsg::Cancel { id: id.to_owned() })
            .map_err(|_| SignFlowError::Aborted)
    }

    /// Returns the number of signing requests currently awaiting a
    /// completion notification.
    pub async fn pending_requests(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Creates a stream of [`LifecycleEvent`]s for observers such as
    /// progress indicators. Purely observational.
    pub async fn subscribe_lifecycle(&self) -> Subscription<LifecycleEvent> {
        let (send, recv) = unbounded_channel();
        self.watchers.lock().await.push(send);
        Subscription::from_receiver(recv)
    }
}

/// Inserts the pending entry and opens its notification subscription.
///
/// The entry is inserted before subscribing so that a notification arriving
/// immediately after the subscription opens still finds it; if subscribing
/// fails the entry is removed again and the caller settled with the error.
async fn track(
    pending: &PendingTable,
    watchers: &Watchers,
    notify: &HubNotifyClient,
    active_subs: &mut SelectAll<Subscription<ChannelEvent>>,
    record: TxRecord,
    request: JsonRpcRequest,
    respond_on: oneshot::Sender<Result<String, SignFlowError>>,
) {
    let channel = job_channel(&record.job_id);
    pending.lock().await.insert(
        record.id.clone(),
        PendingSignRequest {
            id: record.id.clone(),
            job_id: record.job_id.clone(),
            request,
            respond_on,
        },
    );

    match notify.subscribe(&channel, &[UPDATE_TRANSACTION_EVENT]).await {
        Ok(sub) => {
            debug!(%channel, id = %record.id, "watching for transaction updates");
            active_subs.push(sub);
            emit(
                watchers,
                LifecycleEvent::Registered {
                    id: record.id,
                    job_id: record.job_id,
                },
            )
            .await;
        }
        Err(err) => {
            let reason = err.to_string();
            warn!(%channel, id = %record.id, %reason, "subscription setup failed");
            if let Some(entry) = pending.lock().await.remove(&record.id) {
                let _ = entry.respond_on.send(Err(err.into()));
            }
            emit(watchers, LifecycleEvent::Failed { reason }).await;
        }
    }
}

/// Correlates one delivered notification with the pending table.
///
/// Removing the entry is the settle-at-most-once guard: a duplicate or
/// already-settled update finds no entry and is ignored, leaving any other
/// subscriptions untouched.
async fn settle(
    pending: &PendingTable,
    watchers: &Watchers,
    notify: &HubNotifyClient,
    event: ChannelEvent,
) {
    let update = match serde_json::from_value::<TxStatusUpdate>(event.payload.clone()) {
        Ok(update) => update,
        Err(err) => {
            warn!(channel = %event.channel, %err, "undecodable transaction update, ignoring");
            return;
        }
    };

    match pending.lock().await.remove(&update.id) {
        Some(entry) => {
            notify.unsubscribe(&job_channel(&entry.job_id)).await;
            info!(
                id = %entry.id,
                method = %entry.request.method,
                tx_hash = %update.transaction_hash,
                "transaction signed"
            );
            emit(
                watchers,
                LifecycleEvent::Matched {
                    id: update.id,
                    transaction_hash: update.transaction_hash.clone(),
                },
            )
            .await;
            let _ = entry.respond_on.send(Ok(update.transaction_hash));
        }
        None => {
            trace!(id = %update.id, channel = %event.channel, "stale transaction update, ignoring");
        }
    }
}

/// Fans a lifecycle event out to the registered watchers, pruning any whose
/// receiver has been dropped.
async fn emit(watchers: &Watchers, event: LifecycleEvent) {
    trace!(?event, "lifecycle event");
    watchers
        .lock()
        .await
        .retain(|watcher| watcher.send(event.clone()).is_ok());
}
