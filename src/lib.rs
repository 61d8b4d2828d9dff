//! # Amazon Pay Client Library
//!
//! A Rust client library for the Amazon Pay (Off-Amazon Payments) MWS API.
//! It signs requests with HMAC-SHA256 (signature version 2), resolves the
//! regional or overridden service endpoint, encodes parameters per RFC 3986
//! and sends each request exactly once, returning a [`ResponseEnvelope`] with
//! the status code and raw body.
//!
//! ## Modules
//!
//! - [`client`] - HTTP dispatcher and signed API client
//! - [`config`] - Region, environment, proxy and credential configuration
//! - [`endpoint`] - Service endpoint resolution
//! - [`encoding`] - RFC 3986 parameter encoding
//! - [`signature`] - HMAC-SHA256 signatures and timestamps
//! - [`model`] - Request and response envelopes
//! - [`mocks`] - HTTP mocks for testing
//! - [`mock_client`] - Mock dispatcher for offline testing
//!
//! Parsing response bodies into typed models is left to the caller.

pub mod client;
pub mod client_trait;
pub mod config;
pub mod encoding;
pub mod endpoint;
pub mod mock_client;
pub mod mocks;
pub mod model;
pub mod signature;

pub use client::{ApiClient, Error, ErrorKind, HttpDispatcher};
pub use client_trait::Dispatch;
pub use config::{ClientConfig, Environment, ProxyConfig, Region};
pub use mock_client::MockDispatcher;
pub use model::{ErrorResponse, ResponseEnvelope, SigningRequest};
