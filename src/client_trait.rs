//! Trait for request dispatchers
//!
//! The signing layer builds a [`SigningRequest`] and hands it to a dispatcher.
//! The production `HttpDispatcher` and the test `MockDispatcher` both implement
//! this trait, so `ApiClient` can run against either.

use async_trait::async_trait;

use crate::model::{ResponseEnvelope, SigningRequest};
use crate::Error;

/// Performs one HTTP exchange per call.
///
/// Implementations make exactly one attempt and return the status and body for
/// every status code; only failures to complete the exchange are errors.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request: &SigningRequest) -> Result<ResponseEnvelope, Error>;
}
