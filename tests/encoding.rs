use std::collections::BTreeMap;

use amazon_pay::encoding::{encode_parameter_map, parameter_map_to_query_string, url_encode};
use amazon_pay::signature::sign;
use url::form_urlencoded;

fn decode(encoded: &str) -> String {
    form_urlencoded::parse(format!("v={encoded}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

#[test]
fn test_url_encode_round_trip() {
    for s in ["abcXYZ019", "a b", "a*b", "a~b", "κόσμε", "x=1&y=2", "-_.~!'()"] {
        let encoded = url_encode(s);
        assert_eq!(decode(&encoded), s);
        assert_eq!(url_encode(&decode(&encoded)), encoded);
    }
}

#[test]
fn test_url_encode_output_alphabet() {
    let encoded = url_encode("all sorts of !#$&'()*+,/:;=?@[] chars ~ é");
    assert!(encoded
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.~%".contains(c)));
}

#[test]
fn test_encode_then_render_query() {
    let mut params = BTreeMap::new();
    params.insert("A".to_string(), Some("1 2".to_string()));
    params.insert("B".to_string(), None);

    encode_parameter_map(&mut params);
    let query = parameter_map_to_query_string(params.iter().map(|(k, v)| (k, v.as_deref())));

    assert_eq!(query, "A=1%202&B=");
}

#[test]
fn test_sign_is_deterministic_across_inputs() {
    for (message, key) in [("", "k"), ("a", "k"), ("ünïcode", "ключ"), ("long\nmulti\nline", "k2")] {
        assert_eq!(sign(message, key).unwrap(), sign(message, key).unwrap());
    }
}
