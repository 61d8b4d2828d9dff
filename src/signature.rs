//! # Request signing
//!
//! MWS authenticates every call with an HMAC-SHA256 signature (signature
//! version 2) computed over a canonical "string to sign":
//!
//! ```text
//! POST
//! mws.amazonservices.com
//! /OffAmazonPayments_Sandbox/2013-01-01
//! AWSAccessKeyId=...&Action=...&SignatureMethod=HmacSHA256&SignatureVersion=2&Timestamp=...
//! ```
//!
//! The last line holds every parameter sorted by key, with keys and values
//! encoded by [`url_encode`]. The Base64 digest is then sent as the
//! `Signature` parameter.
//!
//! ```rust
//! use amazon_pay::signature::sign;
//!
//! let signature = sign("what do ya want for nothing?", "Jefe").unwrap();
//! assert_eq!(signature, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
//! ```

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use url::Url;

use crate::client::Error;
use crate::encoding::url_encode;
use crate::endpoint::AMAZON_PAY_API_VERSION;

pub type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_METHOD: &str = "HmacSHA256";
pub const SIGNATURE_VERSION: &str = "2";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Computes the Base64-encoded HMAC-SHA256 of `string_to_sign` keyed with
/// `secret_key`.
///
/// # Errors
///
/// Returns a configuration error if the key is empty or rejected by the HMAC
/// primitive.
pub fn sign(string_to_sign: &str, secret_key: &str) -> Result<String, Error> {
    if secret_key.is_empty() {
        return Err(Error::Configuration("secret key must not be empty".to_string()));
    }
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| Error::Configuration(format!("invalid secret key: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Current UTC time as `yyyy-MM-ddTHH:mm:ssZ`.
pub fn timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Builds the signature version 2 string to sign for a request to `endpoint`.
///
/// Parameters are taken in key order (the map is sorted), with keys and values
/// both encoded. `Signature` itself must not be present yet.
pub fn string_to_sign(method: &Method, endpoint: &Url, params: &BTreeMap<String, String>) -> String {
    let host = match (endpoint.host_str(), endpoint.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host.to_ascii_lowercase(), port),
        (Some(host), None) => host.to_ascii_lowercase(),
        (None, _) => String::new(),
    };
    let path = match endpoint.path() {
        "" => "/",
        path => path,
    };

    let canonical = params
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}\n{}\n{}\n{}", method.as_str(), host, path, canonical)
}

/// Adds the authentication parameters to `params` and signs them.
///
/// Inserts `AWSAccessKeyId`, `SignatureMethod`, `SignatureVersion`,
/// `Timestamp` and `Version`, then computes and inserts `Signature`. The
/// returned map still holds raw (unencoded) values.
///
/// # Errors
///
/// Returns a configuration error if the secret key is unusable.
pub fn sign_parameters(
    method: &Method,
    endpoint: &Url,
    mut params: BTreeMap<String, String>,
    access_key: &str,
    secret_key: &str,
    timestamp: &str,
) -> Result<BTreeMap<String, String>, Error> {
    params.remove("Signature");
    params.insert("AWSAccessKeyId".to_string(), access_key.to_string());
    params.insert("SignatureMethod".to_string(), SIGNATURE_METHOD.to_string());
    params.insert("SignatureVersion".to_string(), SIGNATURE_VERSION.to_string());
    params.insert("Timestamp".to_string(), timestamp.to_string());
    params.insert("Version".to_string(), AMAZON_PAY_API_VERSION.to_string());

    let to_sign = string_to_sign(method, endpoint, &params);
    let signature = sign(&to_sign, secret_key)?;
    tracing::trace!("string to sign: {:?}", to_sign);

    params.insert("Signature".to_string(), signature);
    Ok(params)
}
