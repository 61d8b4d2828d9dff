//! Service endpoint resolution.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use url::Url;

use crate::client::Error;
use crate::config::{ClientConfig, Environment, Region};

pub const AMAZON_PAY_API_VERSION: &str = "2013-01-01";

const LIVE_SERVICE_NAME: &str = "OffAmazonPayments";
const SANDBOX_SERVICE_NAME: &str = "OffAmazonPayments_Sandbox";

static MWS_ENDPOINTS: Lazy<HashMap<Region, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Region::Us, "https://mws.amazonservices.com"),
        (Region::Na, "https://mws.amazonservices.com"),
        (Region::Uk, "https://mws-eu.amazonservices.com"),
        (Region::Eu, "https://mws-eu.amazonservices.com"),
        (Region::De, "https://mws-eu.amazonservices.com"),
        (Region::Jp, "https://mws.amazonservices.jp"),
    ])
});

/// Base MWS URL for `region`, without the service path.
pub fn mws_endpoint(region: Region) -> Option<&'static str> {
    MWS_ENDPOINTS.get(&region).copied()
}

/// Service path for `environment`, e.g. `/OffAmazonPayments_Sandbox/2013-01-01`.
pub fn service_version_name(environment: Environment) -> String {
    let service = if environment.is_sandbox() {
        SANDBOX_SERVICE_NAME
    } else {
        LIVE_SERVICE_NAME
    };
    format!("/{}/{}", service, AMAZON_PAY_API_VERSION)
}

/// Resolves the full service endpoint for `config`.
///
/// An override URL is used verbatim in place of the regional base URL. Either
/// way the environment's service path is appended.
///
/// # Errors
///
/// Returns a configuration error if the override URL is malformed or the
/// region has no endpoint.
pub fn service_url_endpoint(config: &ClientConfig) -> Result<String, Error> {
    match config.override_service_url.as_deref() {
        Some(override_url) => {
            Url::parse(override_url).map_err(|e| {
                Error::Configuration(format!("invalid override service URL {override_url:?}: {e}"))
            })?;
            Ok(format!("{}{}", override_url, service_version_name(config.environment)))
        }
        None => regional_endpoint(config.region, config.environment),
    }
}

/// Resolves the service endpoint from a bare region and environment.
///
/// # Errors
///
/// Returns [`Error::UnknownRegion`] if the region has no endpoint.
#[deprecated(note = "does not honor service URL overrides; use service_url_endpoint(&ClientConfig)")]
pub fn service_url_endpoint_for(region: Region, environment: Environment) -> Result<String, Error> {
    regional_endpoint(region, environment)
}

fn regional_endpoint(region: Region, environment: Environment) -> Result<String, Error> {
    let base = mws_endpoint(region).ok_or_else(|| Error::UnknownRegion(region.to_string()))?;
    Ok(format!("{}{}", base, service_version_name(environment)))
}
