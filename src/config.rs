//! Client configuration for the Amazon Pay MWS API.
//!
//! [`ClientConfig`] is owned by the calling application and is only ever read by
//! the dispatcher and the signing helpers. It can be built in code with the
//! `with_*` methods or loaded from `AMAZON_PAY_*` environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use secrecy::Secret;

use crate::client::Error;

/// Marketplace region an account is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Us,
    Na,
    Uk,
    Eu,
    De,
    Jp,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Na => "NA",
            Region::Uk => "UK",
            Region::Eu => "EU",
            Region::De => "DE",
            Region::Jp => "JP",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "NA" => Ok(Region::Na),
            "UK" | "GB" => Ok(Region::Uk),
            "EU" => Ok(Region::Eu),
            "DE" => Ok(Region::De),
            "JP" => Ok(Region::Jp),
            _ => Err(Error::UnknownRegion(s.to_string())),
        }
    }
}

/// Service environment: the sandbox for integration testing, or live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    Sandbox,
    #[default]
    Live,
}

impl Environment {
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => f.write_str("SANDBOX"),
            Environment::Live => f.write_str("LIVE"),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SANDBOX" => Ok(Environment::Sandbox),
            "LIVE" | "PRODUCTION" => Ok(Environment::Live),
            _ => Err(Error::InvalidEnvironment(s.to_string())),
        }
    }
}

/// HTTP proxy used by a single dispatcher.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
}

impl ProxyConfig {
    /// Default port when none is configured, matching plain HTTP proxies.
    pub const DEFAULT_PORT: u16 = 80;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Sets the proxy credentials. Both are required for the proxy to receive
    /// a `Proxy-Authorization` header.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(Secret::new(password.into()));
        self
    }

    /// Proxy URL in the form reqwest expects.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Configuration consumed by the dispatcher, endpoint resolution and signing.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: Region,
    pub environment: Environment,
    pub override_service_url: Option<String>,
    pub application_name: Option<String>,
    pub application_version: Option<String>,
    pub proxy: Option<ProxyConfig>,
    pub merchant_id: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<Secret<String>>,
    pub mws_auth_token: Option<String>,
    /// Per-request timeout in seconds. `None` leaves the request unbounded.
    pub timeout_seconds: Option<u64>,
}

impl ClientConfig {
    pub fn new(region: Region, environment: Environment) -> Self {
        Self {
            region,
            environment,
            override_service_url: None,
            application_name: None,
            application_version: None,
            proxy: None,
            merchant_id: None,
            access_key: None,
            secret_key: None,
            mws_auth_token: None,
            timeout_seconds: None,
        }
    }

    /// Creates a ClientConfig from environment variables
    ///
    /// Environment variables:
    /// - `AMAZON_PAY_REGION`: Region code, e.g. `US`, `UK`, `JP` (required)
    /// - `AMAZON_PAY_ENVIRONMENT`: `SANDBOX` or `LIVE` (default: `LIVE`)
    /// - `AMAZON_PAY_MERCHANT_ID`, `AMAZON_PAY_ACCESS_KEY`, `AMAZON_PAY_SECRET_KEY`
    /// - `AMAZON_PAY_MWS_AUTH_TOKEN`: Token for calls made on behalf of a seller
    /// - `AMAZON_PAY_SERVICE_URL`: Overrides the regional endpoint
    /// - `AMAZON_PAY_APPLICATION_NAME`, `AMAZON_PAY_APPLICATION_VERSION`
    /// - `AMAZON_PAY_PROXY_HOST`, `AMAZON_PAY_PROXY_PORT` (default: 80),
    ///   `AMAZON_PAY_PROXY_USERNAME`, `AMAZON_PAY_PROXY_PASSWORD`
    /// - `AMAZON_PAY_REQUEST_TIMEOUT_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns an error if the region is missing or any variable contains an invalid value
    pub fn from_env() -> Result<Self, Error> {
        let region: Region = env::var("AMAZON_PAY_REGION")
            .map_err(|_| Error::MissingEnvVar("AMAZON_PAY_REGION".to_string()))?
            .parse()?;

        let environment = match env_opt("AMAZON_PAY_ENVIRONMENT") {
            Some(val) => val.parse()?,
            None => Environment::default(),
        };

        let timeout_seconds = match env_opt("AMAZON_PAY_REQUEST_TIMEOUT_SECONDS") {
            Some(val) => {
                let secs = val.parse::<u64>().map_err(|e| {
                    Error::Configuration(format!("Invalid AMAZON_PAY_REQUEST_TIMEOUT_SECONDS: {}", e))
                })?;
                if secs == 0 {
                    return Err(Error::Configuration(
                        "timeout_seconds must be greater than 0".to_string(),
                    ));
                }
                Some(secs)
            }
            None => None,
        };

        let proxy = match env_opt("AMAZON_PAY_PROXY_HOST") {
            Some(host) => {
                let port = match env_opt("AMAZON_PAY_PROXY_PORT") {
                    Some(val) => val.parse::<u16>().map_err(|e| {
                        Error::Configuration(format!("Invalid AMAZON_PAY_PROXY_PORT: {}", e))
                    })?,
                    None => ProxyConfig::DEFAULT_PORT,
                };
                let mut proxy = ProxyConfig::new(host, port);
                proxy.username = env_opt("AMAZON_PAY_PROXY_USERNAME");
                proxy.password = env_opt("AMAZON_PAY_PROXY_PASSWORD").map(Secret::new);
                Some(proxy)
            }
            None => None,
        };

        Ok(Self {
            region,
            environment,
            override_service_url: env_opt("AMAZON_PAY_SERVICE_URL"),
            application_name: env_opt("AMAZON_PAY_APPLICATION_NAME"),
            application_version: env_opt("AMAZON_PAY_APPLICATION_VERSION"),
            proxy,
            merchant_id: env_opt("AMAZON_PAY_MERCHANT_ID"),
            access_key: env_opt("AMAZON_PAY_ACCESS_KEY"),
            secret_key: env_opt("AMAZON_PAY_SECRET_KEY").map(Secret::new),
            mws_auth_token: env_opt("AMAZON_PAY_MWS_AUTH_TOKEN"),
            timeout_seconds,
        })
    }

    /// Sets the seller id and MWS access key pair used to sign requests
    pub fn with_credentials(
        mut self,
        merchant_id: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self.access_key = Some(access_key.into());
        self.secret_key = Some(Secret::new(secret_key.into()));
        self
    }

    /// Sets a service URL that replaces the regional endpoint
    pub fn with_override_service_url(mut self, url: impl Into<String>) -> Self {
        self.override_service_url = Some(url.into());
        self
    }

    /// Sets the application name reported in the User-Agent
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Sets the application version reported in the User-Agent
    pub fn with_application_version(mut self, version: impl Into<String>) -> Self {
        self.application_version = Some(version.into());
        self
    }

    /// Routes this client's requests through the given proxy
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the MWS auth token for calls made on behalf of another seller
    pub fn with_mws_auth_token(mut self, token: impl Into<String>) -> Self {
        self.mws_auth_token = Some(token.into());
        self
    }

    /// Sets a custom timeout value
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
