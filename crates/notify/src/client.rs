//! This module contains the top level [`HubNotifyClient`] implementation.
//!
//! Once the client is attached to a wire stream, consumers of this API create
//! [`Subscription`]s with [`HubNotifyClient::subscribe`]. These subscription
//! objects are primarily worked with via their [`futures::Stream`] trait API.
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::{
    sync::{mpsc, Mutex},
    task::{self, JoinHandle},
};
use tracing::{info, trace};

use crate::{errors::NotifyError, event::ChannelEvent, subscription::Subscription};

struct ChannelSubscriptionDetails {
    channel: String,
    events: Vec<String>,
    outbox: mpsc::UnboundedSender<ChannelEvent>,
}

impl std::fmt::Debug for ChannelSubscriptionDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSubscriptionDetails")
            .field("channel", &self.channel)
            .field("events", &self.events)
            .field("outbox", &self.outbox)
            .finish()
    }
}

/// Main structure responsible for routing notification events from the wire
/// stream to the appropriate subscribers.
///
/// After construction, this object must be kept around for routing to
/// continue. Dropping the last clone of this object aborts the router task.
#[derive(Debug, Clone)]
pub struct HubNotifyClient {
    subs: Arc<Mutex<Vec<ChannelSubscriptionDetails>>>,
    router_handle: Arc<JoinHandle<()>>,
}

impl Drop for HubNotifyClient {
    fn drop(&mut self) {
        if Arc::strong_count(&self.router_handle) == 1 {
            self.router_handle.abort();
        }
    }
}

impl HubNotifyClient {
    /// Primary constructor for [`HubNotifyClient`].
    ///
    /// It takes the stream of raw [`ChannelEvent`]s produced by the socket
    /// transport and spawns the router task that fans them out.
    pub fn connect<S>(wire: S) -> Self
    where
        S: Stream<Item = ChannelEvent> + Send + 'static,
    {
        let subs = Arc::new(Mutex::new(Vec::<ChannelSubscriptionDetails>::new()));
        let subs_router = subs.clone();
        let router_handle = Arc::new(task::spawn(async move {
            let mut wire = Box::pin(wire);
            info!("listening for hub notifications");
            while let Some(event) = wire.next().await {
                trace!(channel = %event.channel, kind = %event.event, "received event");
                subs_router.lock().await.retain(|sub| {
                    if sub.channel != event.channel || !sub.events.contains(&event.event) {
                        return true;
                    }
                    // A send error means the receiver has been dropped, so
                    // the subscription is pruned.
                    sub.outbox.send(event.clone()).is_ok()
                });
            }
            info!("hub notification stream ended");
        }));

        HubNotifyClient {
            subs,
            router_handle,
        }
    }

    /// Creates a new [`Subscription`] that emits every event published on
    /// `channel` whose kind is listed in `events`.
    ///
    /// Fails with [`NotifyError::Disconnected`] once the wire stream has
    /// terminated, since such a subscription could never fire.
    pub async fn subscribe(
        &self,
        channel: &str,
        events: &[&str],
    ) -> Result<Subscription<ChannelEvent>, NotifyError> {
        if self.router_handle.is_finished() {
            return Err(NotifyError::Disconnected);
        }

        let (send, recv) = mpsc::unbounded_channel();
        let details = ChannelSubscriptionDetails {
            channel: channel.to_owned(),
            events: events.iter().map(|e| (*e).to_owned()).collect(),
            outbox: send,
        };
        trace!(?details, "subscribing to channel");

        self.subs.lock().await.push(details);

        Ok(Subscription::from_receiver(recv))
    }

    /// Tears down every subscription on `channel`.
    ///
    /// Their [`Subscription`] streams terminate once any already-delivered
    /// events have been drained.
    pub async fn unsubscribe(&self, channel: &str) {
        trace!(%channel, "unsubscribing from channel");
        self.subs.lock().await.retain(|sub| sub.channel != channel);
    }

    /// Returns the number of active subscriptions created with
    /// [`HubNotifyClient::subscribe`].
    pub async fn num_subscriptions(&self) -> usize {
        self.subs.lock().await.len()
    }
}
