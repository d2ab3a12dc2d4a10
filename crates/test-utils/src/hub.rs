//! An in-memory stand-in for the signing hub.

use std::{
    collections::VecDeque,
    sync::Mutex,
};

use async_trait::async_trait;
use hub_client::{HubClientError, SigningService};
use hub_sign_primitives::hub::{SignRequest, TxRecord};

/// A scriptable [`SigningService`] that pops pre-queued responses and
/// records every registration request it receives.
#[derive(Debug, Default)]
pub struct MockSigningService {
    responses: Mutex<VecDeque<Result<TxRecord, HubClientError>>>,
    calls: Mutex<Vec<SignRequest>>,
}

impl MockSigningService {
    /// Creates a mock with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful registration returning the given record.
    pub fn enqueue_record(&self, id: &str, job_id: &str) {
        self.responses.lock().unwrap().push_back(Ok(TxRecord {
            id: id.to_owned(),
            job_id: job_id.to_owned(),
        }));
    }

    /// Queues a rejection carrying the given hub error message.
    pub fn enqueue_rejection(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(HubClientError::Rejected {
                status: 400,
                message: message.to_owned(),
            }));
    }

    /// Returns every registration request received so far.
    pub fn calls(&self) -> Vec<SignRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns how many registration requests were received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SigningService for MockSigningService {
    async fn register_transaction(&self, request: SignRequest) -> Result<TxRecord, HubClientError> {
        self.calls.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock hub has no queued response")
    }
}
