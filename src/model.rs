use std::collections::HashMap;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::Error;

/// A single HTTP exchange to be dispatched.
///
/// The body, when present, is expected to be URL-encoded already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    method: Method,
    url: Url,
    body: Option<String>,
    headers: HashMap<String, String>,
}

impl SigningRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            headers: HashMap::new(),
        }
    }

    /// Parses `url` and builds a request for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UrlParse`] if the URL is malformed.
    pub fn parse(method: Method, url: &str) -> Result<Self, Error> {
        Ok(Self::new(method, Url::parse(url)?))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The service only treats 200 as success.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Deserializes a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseParsingFailed`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| Error::ResponseParsingFailed(e.to_string()))
    }

    /// Extracts the MWS error document from a non-200 XML body, if there is one.
    ///
    /// Entities in the text are decoded. A body that is not an
    /// `<ErrorResponse>` document yields `None`.
    pub fn error_response(&self) -> Option<ErrorResponse> {
        if self.is_success() {
            return None;
        }
        let document: ErrorDocument = quick_xml::de::from_str(&self.body).ok()?;
        let mut error = document.error;
        if error.request_id.is_none() {
            error.request_id = document.request_id;
        }
        Some(error)
    }
}

/// Error details returned by MWS in the `<Error>` element of an
/// `<ErrorResponse>` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Type")]
    pub error_type: Option<String>,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    /// Taken from the enclosing document when `<Error>` does not carry one.
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(rename = "Error")]
    error: ErrorResponse,
    #[serde(rename = "RequestId")]
    request_id: Option<String>,
}
