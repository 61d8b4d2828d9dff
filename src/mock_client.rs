//! Mock dispatcher for testing
//!
//! `MockDispatcher` implements [`Dispatch`] without opening a socket. It
//! returns queued envelopes (or a default one) and records every request it
//! receives, so code built on `ApiClient` can be tested offline.
//!
//! # Examples
//!
//! ```rust
//! use amazon_pay::{ApiClient, ClientConfig, Environment, MockDispatcher, Region, ResponseEnvelope};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = MockDispatcher::new()
//!     .with_response(ResponseEnvelope::new(200, "<GetServiceStatusResponse/>"));
//! let config = ClientConfig::new(Region::Us, Environment::Sandbox)
//!     .with_credentials("SELLER", "AKID", "SECRET");
//! let client = ApiClient::with_dispatcher(config, dispatcher);
//!
//! let response = client.get_service_status().await?;
//! assert_eq!(response.status, 200);
//! assert_eq!(client.dispatcher().requests().len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::Error;
use crate::client_trait::Dispatch;
use crate::model::{ResponseEnvelope, SigningRequest};

#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    inner: Arc<MockDispatcherInner>,
}

#[derive(Debug, Default)]
struct MockDispatcherInner {
    responses: Mutex<VecDeque<Result<ResponseEnvelope, String>>>,
    requests: Mutex<Vec<SigningRequest>>,
}

impl MockDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an envelope to return from the next unanswered call.
    #[must_use]
    pub fn with_response(self, response: ResponseEnvelope) -> Self {
        self.push_response(response);
        self
    }

    /// Queues a failure for the next unanswered call.
    ///
    /// The failure is always an [`Error::Encoding`], so it is never retryable.
    /// Transport errors wrap a `reqwest::Error`, which cannot be built by hand;
    /// point an `HttpDispatcher` at a closed port to exercise that path.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.lock_responses().push_back(Err(message.into()));
        self
    }

    pub fn push_response(&self, response: ResponseEnvelope) {
        self.lock_responses().push_back(Ok(response));
    }

    /// Every request dispatched so far, oldest first.
    pub fn requests(&self) -> Vec<SigningRequest> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<SigningRequest> {
        self.requests().pop()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<ResponseEnvelope, String>>> {
        self.inner.responses.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Dispatch for MockDispatcher {
    async fn dispatch(&self, request: &SigningRequest) -> Result<ResponseEnvelope, Error> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.lock_responses().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Encoding(message)),
            None => Ok(ResponseEnvelope::new(200, "")),
        }
    }
}
