//! Parameter encoding helpers.
//!
//! MWS signs the percent-encoded form of every parameter, so the encoding has
//! to be exact: only the RFC 3986 unreserved set (`A-Z a-z 0-9 - _ . ~`) is
//! left literal and everything else becomes an uppercase `%XX` triplet of its
//! UTF-8 bytes.

use url::form_urlencoded;

const REMOVED: &str = "*** Removed ***";

/// Parameters whose values are never written to the logs.
const SENSITIVE_PARAMETERS: &[&str] = &[
    "AWSAccessKeyId",
    "Signature",
    "MWSAuthToken",
    "SellerNote",
    "SellerAuthorizationNote",
    "SellerCaptureNote",
    "SellerRefundNote",
    "SoftDescriptor",
    "Name",
    "Email",
    "Phone",
    "AddressLine1",
    "AddressLine2",
    "AddressLine3",
    "City",
    "PostalCode",
];

/// Percent-encodes `value` per RFC 3986.
///
/// Starts from the `application/x-www-form-urlencoded` serialisation and then
/// fixes the three places where it differs: `+` (an encoded space) becomes
/// `%20`, a literal `*` becomes `%2A` and `%7E` is turned back into `~`.
pub fn url_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Like [`url_encode`], treating a missing value as the empty string.
pub fn url_encode_opt(value: Option<&str>) -> String {
    url_encode(value.unwrap_or_default())
}

/// Encodes every value of `params` in place. Keys are left untouched and a
/// missing value becomes an empty string.
///
/// Accepts anything that yields `(&K, &mut Option<String>)`, such as
/// `&mut BTreeMap<String, Option<String>>` or `&mut HashMap<String, Option<String>>`.
pub fn encode_parameter_map<'a, K, I>(params: I)
where
    K: 'a,
    I: IntoIterator<Item = (&'a K, &'a mut Option<String>)>,
{
    for (_, value) in params {
        *value = Some(url_encode_opt(value.as_deref()));
    }
}

/// Renders `key=value` pairs joined with `&`, in the order they are given.
///
/// A missing value renders as `key=`. Values are written as-is; encode them
/// first with [`encode_parameter_map`] if they are not already encoded.
pub fn parameter_map_to_query_string<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = String::new();
    for (i, (key, value)) in params.into_iter().enumerate() {
        if i > 0 {
            query.push('&');
        }
        query.push_str(key.as_ref());
        query.push('=');
        if let Some(value) = value {
            query.push_str(value.as_ref());
        }
    }
    query
}

/// Masks the values of sensitive parameters in a `key=value&...` string so it
/// can be logged.
pub fn sanitize_for_log(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive(key) => format!("{key}={REMOVED}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive(key: &str) -> bool {
    // Nested parameters such as `OrderReferenceAttributes.SellerNote`.
    let leaf = key.rsplit('.').next().unwrap_or(key);
    SENSITIVE_PARAMETERS.contains(&leaf)
}
