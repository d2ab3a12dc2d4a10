//! Tests for the pending-request correlation engine: registration,
//! notification matching, settlement, and teardown.

use std::{future::Future, sync::Arc, time::Duration};

use futures::StreamExt;
use hub_client::HubClientError;
use hub_notify::{client::HubNotifyClient, event::ChannelEvent};
use hub_sign_common::logging::{self, LoggerConfig};
use hub_sign_primitives::{context::JobContext, rpc::JsonRpcRequest};
use hub_sign_provider::{
    errors::{ProviderError, SignFlowError},
    events::LifecycleEvent,
    HubSignProvider, ProviderConfig,
};
use hub_sign_test_utils::{
    hub::MockSigningService,
    wire::{update_transaction_event, wire_channel},
    TEST_FROM_ADDRESS,
};
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;

fn setup(
    sign_timeout: Option<Duration>,
) -> (
    Arc<MockSigningService>,
    UnboundedSender<ChannelEvent>,
    HubNotifyClient,
    HubSignProvider,
) {
    logging::init(LoggerConfig::with_base_name("correlation-test"));

    let hub = Arc::new(MockSigningService::new());
    let (wire_tx, notify) = wire_channel();
    let mut config = ProviderConfig::new(TEST_FROM_ADDRESS, "http://127.0.0.1:9", "1");
    config.sign_timeout = sign_timeout;
    let job_context = JobContext {
        project_id: Some("proj".to_owned()),
        build_config_id: Some("build".to_owned()),
        ci_job_id: Some("ci".to_owned()),
    };
    let provider =
        HubSignProvider::with_job_context(config, job_context, hub.clone(), notify.clone())
            .expect("config must be valid");
    (hub, wire_tx, notify, provider)
}

fn send_transaction_request(id: u64) -> JsonRpcRequest {
    JsonRpcRequest::new(id, "eth_sendTransaction", vec![json!({"to": "0x0"})])
}

/// Polls `cond` until it holds or a generous deadline expires.
async fn wait_until<F, Fut>(what: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for: {what}"));
}

#[tokio::test]
async fn sign_call_resolves_to_the_reported_transaction_hash() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");

    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });

    wait_until("subscription to open", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 1 }
    })
    .await;
    assert_eq!(provider.pending_sign_requests().await, 1);

    wire_tx
        .send(update_transaction_event("job1", "tx1", "0xabc"))
        .unwrap();

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xabc")));
    assert_eq!(response.id, 1);

    // Settlement tears the whole flow down: entry gone, channel
    // unsubscribed.
    assert_eq!(provider.pending_sign_requests().await, 0);
    assert_eq!(notify.num_subscriptions().await, 0);

    // The hub was called exactly once, with the configured identity and the
    // unmodified payload.
    assert_eq!(hub.call_count(), 1);
    let call = hub.calls().remove(0);
    assert_eq!(call.from, TEST_FROM_ADDRESS);
    assert_eq!(call.network_id, "1");
    assert_eq!(call.project_id.as_deref(), Some("proj"));
    assert_eq!(call.build_config_id.as_deref(), Some("build"));
    assert_eq!(call.ci_job_id.as_deref(), Some("ci"));
    assert_eq!(call.rpc_payload.method, "eth_sendTransaction");
}

#[tokio::test]
async fn eth_sign_goes_through_the_same_flow() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx9", "job9");

    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move {
            provider
                .dispatch(JsonRpcRequest::new(2, "eth_sign", vec![json!("0xdata")]))
                .await
        }
    });

    wait_until("subscription to open", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 1 }
    })
    .await;
    wire_tx
        .send(update_transaction_event("job9", "tx9", "0xsigned"))
        .unwrap();

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xsigned")));
}

#[tokio::test]
async fn duplicate_updates_settle_exactly_once() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");

    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });

    wait_until("subscription to open", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 1 }
    })
    .await;

    // Deliver the same completion three times.
    for _ in 0..3 {
        wire_tx
            .send(update_transaction_event("job1", "tx1", "0xabc"))
            .unwrap();
    }

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xabc")));

    // The duplicates found no entry and were ignored; the engine is still
    // healthy and fully torn down.
    wait_until("teardown", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 0 }
    })
    .await;
    assert_eq!(provider.pending_sign_requests().await, 0);
}

#[tokio::test]
async fn unrelated_updates_never_settle_a_pending_request() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");

    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });

    wait_until("subscription to open", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 1 }
    })
    .await;

    // An update for a different internal id on the same job channel must be
    // ignored and must keep the subscription open.
    wire_tx
        .send(update_transaction_event("job1", "tx-other", "0xdead"))
        .unwrap();
    // An event on an unrelated channel must not reach this flow at all.
    wire_tx
        .send(update_transaction_event("job-unrelated", "tx1", "0xdead"))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.pending_sign_requests().await, 1);
    assert_eq!(notify.num_subscriptions().await, 1);

    wire_tx
        .send(update_transaction_event("job1", "tx1", "0xabc"))
        .unwrap();
    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xabc")));
}

#[tokio::test]
async fn concurrent_sign_flows_are_independent() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");
    hub.enqueue_record("tx2", "job2");

    let first = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });
    // Serialize the registrations so the record-to-request mapping is
    // deterministic.
    wait_until("first registration", || {
        let hub = hub.clone();
        async move { hub.call_count() == 1 }
    })
    .await;

    let second = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(2)).await }
    });
    wait_until("both subscriptions", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 2 }
    })
    .await;

    // Resolve the second job first.
    wire_tx
        .send(update_transaction_event("job2", "tx2", "0xbbb"))
        .unwrap();
    let response = second.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xbbb")));

    // The first flow is untouched by the second one settling.
    assert_eq!(provider.pending_sign_requests().await, 1);
    assert_eq!(notify.num_subscriptions().await, 1);

    wire_tx
        .send(update_transaction_event("job1", "tx1", "0xaaa"))
        .unwrap();
    let response = first.await.unwrap().unwrap();
    assert_eq!(response.result, Some(json!("0xaaa")));

    assert_eq!(provider.pending_sign_requests().await, 0);
    assert_eq!(notify.num_subscriptions().await, 0);
}

#[tokio::test]
async fn registration_failure_leaves_no_pending_entry() {
    let (hub, _wire_tx, notify, provider) = setup(None);
    hub.enqueue_rejection("from address is not authorized");

    let outcome = provider.dispatch(send_transaction_request(1)).await;

    match outcome {
        Err(ProviderError::Sign(SignFlowError::Registration(HubClientError::Rejected {
            message,
            ..
        }))) => {
            assert_eq!(message, "from address is not authorized");
        }
        other => panic!("expected a registration rejection, got {other:?}"),
    }

    assert_eq!(provider.pending_sign_requests().await, 0);
    assert_eq!(notify.num_subscriptions().await, 0);
}

#[tokio::test]
async fn subscription_failure_removes_the_inserted_entry() {
    let (hub, wire_tx, notify, provider) = setup(None);

    // Disconnect the transport and wait for the router to notice.
    drop(wire_tx);
    wait_until("transport disconnect", || {
        let notify = notify.clone();
        async move { notify.subscribe("probe", &[]).await.is_err() }
    })
    .await;

    hub.enqueue_record("tx1", "job1");
    let outcome = provider.dispatch(send_transaction_request(1)).await;

    assert!(matches!(
        outcome,
        Err(ProviderError::Sign(SignFlowError::Subscription(_)))
    ));
    // The hub accepted the registration, yet no entry may linger.
    assert_eq!(hub.call_count(), 1);
    assert_eq!(provider.pending_sign_requests().await, 0);
}

#[tokio::test]
async fn sign_timeout_tears_the_flow_down() {
    let (hub, _wire_tx, notify, provider) = setup(Some(Duration::from_millis(50)));
    hub.enqueue_record("tx1", "job1");

    let outcome = provider.dispatch(send_transaction_request(1)).await;
    assert!(matches!(
        outcome,
        Err(ProviderError::Sign(SignFlowError::TimedOut))
    ));

    // Teardown is asynchronous; wait for it rather than racing it.
    wait_until("timeout teardown", || {
        let provider = provider.clone();
        let notify = notify.clone();
        async move {
            provider.pending_sign_requests().await == 0 && notify.num_subscriptions().await == 0
        }
    })
    .await;
}

#[tokio::test]
async fn cancel_settles_the_waiting_call() {
    let (hub, _wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");

    let mut lifecycle = provider.subscribe_lifecycle().await;
    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });

    assert_eq!(
        lifecycle.next().await,
        Some(LifecycleEvent::Submitted {
            method: "eth_sendTransaction".to_owned()
        })
    );
    let registered = lifecycle.next().await.unwrap();
    let LifecycleEvent::Registered { id, job_id } = registered else {
        panic!("expected a Registered event, got {registered:?}");
    };
    assert_eq!(job_id, "job1");

    provider.cancel_sign_request(&id).unwrap();

    let outcome = in_flight.await.unwrap();
    assert!(matches!(
        outcome,
        Err(ProviderError::Sign(SignFlowError::Cancelled))
    ));
    assert_eq!(provider.pending_sign_requests().await, 0);
    assert_eq!(notify.num_subscriptions().await, 0);
    assert!(matches!(
        lifecycle.next().await,
        Some(LifecycleEvent::Failed { .. })
    ));
}

#[tokio::test]
async fn lifecycle_reports_the_happy_path_in_order() {
    let (hub, wire_tx, notify, provider) = setup(None);
    hub.enqueue_record("tx1", "job1");

    let mut lifecycle = provider.subscribe_lifecycle().await;
    let in_flight = tokio::spawn({
        let provider = provider.clone();
        async move { provider.dispatch(send_transaction_request(1)).await }
    });

    wait_until("subscription to open", || {
        let notify = notify.clone();
        async move { notify.num_subscriptions().await == 1 }
    })
    .await;
    wire_tx
        .send(update_transaction_event("job1", "tx1", "0xabc"))
        .unwrap();
    in_flight.await.unwrap().unwrap();

    assert_eq!(
        lifecycle.next().await,
        Some(LifecycleEvent::Submitted {
            method: "eth_sendTransaction".to_owned()
        })
    );
    assert_eq!(
        lifecycle.next().await,
        Some(LifecycleEvent::Registered {
            id: "tx1".to_owned(),
            job_id: "job1".to_owned()
        })
    );
    assert_eq!(
        lifecycle.next().await,
        Some(LifecycleEvent::Matched {
            id: "tx1".to_owned(),
            transaction_hash: "0xabc".to_owned()
        })
    );
}
