use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Proxy, Url};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::client_trait::Dispatch;
use crate::config::ClientConfig;
use crate::encoding::{
    encode_parameter_map, parameter_map_to_query_string, sanitize_for_log, url_encode,
};
use crate::endpoint::service_url_endpoint;
use crate::model::{ResponseEnvelope, SigningRequest};
use crate::signature::{sign_parameters, timestamp};

pub const SDK_NAME: &str = "amazon-pay-rs";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Missing {0} environment variable")]
    MissingEnvVar(String),
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
    #[error("Invalid environment {0:?}: expected SANDBOX or LIVE")]
    InvalidEnvironment(String),
    #[error("Failed to parse url: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Failed to parse response: {0}")]
    ResponseParsingFailed(String),
}

/// Broad failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing configuration. Retrying cannot help.
    Configuration,
    /// The HTTP exchange could not be completed.
    Transport,
    /// A character set conversion failed.
    Encoding,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_)
            | Error::MissingEnvVar(_)
            | Error::UnknownRegion(_)
            | Error::InvalidEnvironment(_)
            | Error::UrlParse(_)
            | Error::InvalidHeader(_) => ErrorKind::Configuration,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Encoding(_) | Error::ResponseParsingFailed(_) => ErrorKind::Encoding,
        }
    }

    /// Returns true if the caller may reasonably retry the call.
    ///
    /// This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(format!("response body is not valid UTF-8: {}", err))
    }
}

/// Composes the User-Agent sent by config-aware dispatchers.
///
/// `amazon-pay-rs/<version> (<app>/<app version>; Rust; <os>/<arch>)`, where the
/// application part shrinks to whichever of name and version is set, or is
/// left out entirely.
pub fn user_agent(config: &ClientConfig) -> String {
    let name = non_blank(config.application_name.as_deref());
    let version = non_blank(config.application_version.as_deref());

    let mut ua = format!("{}/{} (", SDK_NAME, SDK_VERSION);
    match (name, version) {
        (Some(name), Some(version)) => ua.push_str(&format!("{}/{}; ", name, version)),
        (None, Some(version)) => ua.push_str(&format!("{}; ", version)),
        (Some(name), None) => ua.push_str(&format!("{}; ", name)),
        (None, None) => {}
    }
    ua.push_str(&format!(
        "Rust; {}/{})",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));
    ua
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Sends [`SigningRequest`]s over HTTP, one attempt per call.
///
/// Proxy and User-Agent settings live on this dispatcher's own client, so two
/// dispatchers with different proxies can be used side by side.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    user_agent: Option<String>,
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDispatcher {
    /// Creates a dispatcher with no proxy and no User-Agent.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            user_agent: None,
        }
    }

    /// Creates a dispatcher from a client configuration.
    ///
    /// Sets the composed User-Agent, the request timeout if one is configured,
    /// and the proxy if a host is configured. With both a username and a
    /// password the proxy receives `Proxy-Authorization: Basic ...`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the timeout is zero, or if the proxy
    /// URL or the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let user_agent = user_agent(config);
        let mut builder = Client::builder().user_agent(user_agent.clone());

        match config.timeout_seconds {
            Some(0) => {
                return Err(Error::Configuration(
                    "timeout_seconds must be greater than 0".to_string(),
                ))
            }
            Some(secs) => builder = builder.timeout(StdDuration::from_secs(secs)),
            None => {}
        }

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = Proxy::all(proxy_config.url()).map_err(|e| {
                Error::Configuration(format!("invalid proxy {}: {}", proxy_config.url(), e))
            })?;
            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password.expose_secret());
            }
            tracing::debug!("Using proxy {}", proxy_config.url());
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: Some(user_agent),
        })
    }

    /// The User-Agent this dispatcher sends, if any.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends `request` and returns its status and body.
    ///
    /// Every status code yields an envelope; the body is read from the error
    /// response when the status is not 200.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHeader`] if a header name or value is not a valid
    ///   HTTP token or visible ASCII; nothing is sent in that case
    /// - [`Error::Transport`] for connection, timeout and read failures
    /// - [`Error::Encoding`] if the body is not valid UTF-8
    pub async fn send(&self, request: &SigningRequest) -> Result<ResponseEnvelope, Error> {
        let headers = header_map(request)?;

        tracing::debug!(
            "Request: method={} url={} body={}",
            request.method(),
            loggable_url(request.url()),
            request.body().map(sanitize_for_log).unwrap_or_default()
        );

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec())?;

        if status == 200 {
            tracing::debug!("Response: status={}", status);
        } else {
            tracing::warn!(
                "Request to {} returned status {}",
                loggable_url(request.url()),
                status
            );
        }

        Ok(ResponseEnvelope::new(status, body))
    }
}

#[async_trait]
impl Dispatch for HttpDispatcher {
    async fn dispatch(&self, request: &SigningRequest) -> Result<ResponseEnvelope, Error> {
        self.send(request).await
    }
}

/// The URL with sensitive query parameters masked.
fn loggable_url(url: &Url) -> String {
    match url.query() {
        Some(query) => format!(
            "{}?{}",
            &url[..url::Position::AfterPath],
            sanitize_for_log(query)
        ),
        None => url.to_string(),
    }
}

fn header_map(request: &SigningRequest) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::with_capacity(request.headers().len() + 1);
    for (name, value) in request.headers() {
        let header_name = HeaderName::from_str(name)
            .map_err(|e| Error::InvalidHeader(format!("{:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidHeader(format!("value of {}: {}", name, e)))?;
        headers.insert(header_name, header_value);
    }
    if request.body().is_some() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    }
    Ok(headers)
}

/// Signed MWS client.
///
/// Builds signature version 2 requests for the configured seller and posts
/// them through a [`Dispatch`] implementation, [`HttpDispatcher`] by default.
#[derive(Debug, Clone)]
pub struct ApiClient<D = HttpDispatcher> {
    config: ClientConfig,
    dispatcher: D,
}

#[allow(clippy::missing_errors_doc)]
impl ApiClient<HttpDispatcher> {
    /// Creates a client with an HTTP dispatcher built from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let dispatcher = HttpDispatcher::from_config(&config)?;
        Ok(Self { config, dispatcher })
    }

    /// Creates a client from `AMAZON_PAY_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }
}

#[allow(clippy::missing_errors_doc)]
impl<D: Dispatch> ApiClient<D> {
    /// Creates a client that sends through a custom dispatcher (useful for testing).
    pub fn with_dispatcher(config: ClientConfig, dispatcher: D) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Builds the signed POST request for `action` at the given timestamp.
    ///
    /// `Action`, `SellerId` and, when configured, `MWSAuthToken` are added to
    /// `params` before signing. The body holds every parameter with both key
    /// and value encoded, exactly as they appear in the string to sign.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the seller id, access key or secret
    /// key is missing, or if the endpoint cannot be resolved.
    pub fn signed_request(
        &self,
        action: &str,
        mut params: BTreeMap<String, String>,
        timestamp: &str,
    ) -> Result<SigningRequest, Error> {
        let merchant_id = required(self.config.merchant_id.as_deref(), "merchant id")?;
        let access_key = required(self.config.access_key.as_deref(), "access key")?;
        let secret_key = self
            .config
            .secret_key
            .as_ref()
            .ok_or_else(|| Error::Configuration("secret key is not configured".to_string()))?;

        let endpoint = Url::parse(&service_url_endpoint(&self.config)?)?;

        params.insert("Action".to_string(), action.to_string());
        params.insert("SellerId".to_string(), merchant_id.to_string());
        if let Some(token) = non_blank(self.config.mws_auth_token.as_deref()) {
            params.insert("MWSAuthToken".to_string(), token.to_string());
        }

        let signed = sign_parameters(
            &Method::POST,
            &endpoint,
            params,
            access_key,
            secret_key.expose_secret(),
            timestamp,
        )?;

        let mut encoded: BTreeMap<String, Option<String>> =
            signed.into_iter().map(|(k, v)| (k, Some(v))).collect();
        encode_parameter_map(&mut encoded);
        // Keys are signed encoded, so the body must carry them encoded too.
        let body = parameter_map_to_query_string(
            encoded.iter().map(|(k, v)| (url_encode(k), v.as_deref())),
        );

        Ok(SigningRequest::new(Method::POST, endpoint)
            .with_header(CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE)
            .with_body(body))
    }

    /// Signs and posts `action` with `params`, returning the raw envelope.
    ///
    /// Non-200 responses are returned as envelopes; see
    /// [`ResponseEnvelope::error_response`] for the MWS error details.
    pub async fn post_action(
        &self,
        action: &str,
        params: BTreeMap<String, String>,
    ) -> Result<ResponseEnvelope, Error> {
        let request = self.signed_request(action, params, &timestamp())?;
        tracing::info!("Calling {} on {}", action, loggable_url(request.url()));
        self.dispatcher.dispatch(&request).await
    }

    /// Calls `GetServiceStatus`.
    pub async fn get_service_status(&self) -> Result<ResponseEnvelope, Error> {
        self.post_action("GetServiceStatus", BTreeMap::new()).await
    }
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, Error> {
    non_blank(value).ok_or_else(|| Error::Configuration(format!("{} is not configured", what)))
}
