use std::collections::BTreeMap;

use amazon_pay::client::{ErrorKind, FORM_CONTENT_TYPE, SDK_NAME};
use amazon_pay::mocks::{mock_get, mock_get_service_status, mock_signature_mismatch};
use amazon_pay::{
    ApiClient, ClientConfig, Environment, Error, HttpDispatcher, ProxyConfig, Region,
    SigningRequest,
};
use httpmock::prelude::*;
use reqwest::Method;

fn sandbox_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Region::Us, Environment::Sandbox)
        .with_credentials("SELLER1", "AKID", "SECRET")
        .with_override_service_url(server.base_url())
}

#[tokio::test]
async fn test_dispatch_get_ok() {
    let server = MockServer::start();
    let mock = mock_get(&server, "/ok", 200, "OK");

    let request = SigningRequest::parse(Method::GET, &server.url("/ok")).unwrap();
    let response = HttpDispatcher::new().send(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "OK");
    assert!(response.is_success());
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_dispatch_not_found_returns_envelope() {
    let server = MockServer::start();
    let mock = mock_get(&server, "/missing", 404, "err");

    let request = SigningRequest::parse(Method::GET, &server.url("/missing")).unwrap();
    let response = HttpDispatcher::new().send(&request).await.unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, "err");
    assert!(!response.is_success());
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_dispatch_server_error_is_not_retried() {
    let server = MockServer::start();
    let mock = mock_get(&server, "/boom", 500, "server error");

    let request = SigningRequest::parse(Method::GET, &server.url("/boom")).unwrap();
    let response = HttpDispatcher::new().send(&request).await.unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.body, "server error");
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_dispatch_sends_headers_and_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/echo")
            .header("x-custom", "value")
            .header("content-type", FORM_CONTENT_TYPE)
            .body("A=1&B=");
        then.status(200).body("done");
    });

    let request = SigningRequest::parse(Method::PUT, &server.url("/echo"))
        .unwrap()
        .with_header("X-Custom", "value")
        .with_body("A=1&B=");
    let response = HttpDispatcher::new().send(&request).await.unwrap();

    assert_eq!(response.body, "done");
    mock.assert();
}

#[tokio::test]
async fn test_dispatch_with_config_sends_user_agent() {
    let server = MockServer::start();
    let config = ClientConfig::new(Region::Us, Environment::Live)
        .with_application_name("shop")
        .with_application_version("3.0");
    let expected = format!(
        "{}/{} (shop/3.0; Rust; {}/{})",
        SDK_NAME,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ua").header("user-agent", expected.as_str());
        then.status(200).body("OK");
    });

    let dispatcher = HttpDispatcher::from_config(&config).unwrap();
    let request = SigningRequest::parse(Method::GET, &server.url("/ua")).unwrap();
    let response = dispatcher.send(&request).await.unwrap();

    assert_eq!(response.status, 200);
    mock.assert();
}

#[tokio::test]
async fn test_dispatch_invalid_header_fails_before_sending() {
    let server = MockServer::start();
    let mock = mock_get(&server, "/ok", 200, "OK");

    let request = SigningRequest::parse(Method::GET, &server.url("/ok"))
        .unwrap()
        .with_header("X-Bad", "bad\r\nvalue");
    let err = HttpDispatcher::new().send(&request).await.unwrap_err();

    assert!(matches!(err, Error::InvalidHeader(_)));
    mock.assert_hits(0);
}

#[tokio::test]
async fn test_dispatch_connection_refused_is_transport_error() {
    // Port 9 (discard) is not expected to be listening.
    let request = SigningRequest::parse(Method::GET, "http://127.0.0.1:9/").unwrap();
    let err = HttpDispatcher::new().send(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_dispatch_rejects_non_utf8_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/binary");
        then.status(200).body(vec![0xff_u8, 0xfe, 0xfd]);
    });

    let request = SigningRequest::parse(Method::GET, &server.url("/binary")).unwrap();
    let err = HttpDispatcher::new().send(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[tokio::test]
async fn test_api_client_get_service_status() {
    let server = MockServer::start();
    let mock = mock_get_service_status(&server, Environment::Sandbox);

    let client = ApiClient::new(sandbox_config(&server)).unwrap();
    let response = client.get_service_status().await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.body.contains("<Status>GREEN</Status>"));
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_api_client_posts_action_parameters() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/OffAmazonPayments_Sandbox/2013-01-01")
            .body_contains("Action=GetOrderReferenceDetails")
            .body_contains("AmazonOrderReferenceId=S01-1234567-1234567")
            .body_contains("SellerId=SELLER1")
            .body_contains("MWSAuthToken=amzn.mws.token")
            .body_contains("AWSAccessKeyId=AKID")
            .body_contains("Signature=");
        then.status(200).body("<GetOrderReferenceDetailsResponse/>");
    });

    let client =
        ApiClient::new(sandbox_config(&server).with_mws_auth_token("amzn.mws.token")).unwrap();
    let mut params = BTreeMap::new();
    params.insert(
        "AmazonOrderReferenceId".to_string(),
        "S01-1234567-1234567".to_string(),
    );
    let response = client
        .post_action("GetOrderReferenceDetails", params)
        .await
        .unwrap();

    assert_eq!(response.body, "<GetOrderReferenceDetailsResponse/>");
    mock.assert();
}

#[tokio::test]
async fn test_api_client_live_endpoint_path() {
    let server = MockServer::start();
    let mock = mock_get_service_status(&server, Environment::Live);

    let config = ClientConfig::new(Region::Uk, Environment::Live)
        .with_credentials("SELLER1", "AKID", "SECRET")
        .with_override_service_url(server.base_url());
    let response = ApiClient::new(config)
        .unwrap()
        .get_service_status()
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    mock.assert();
}

#[tokio::test]
async fn test_api_client_error_response() {
    let server = MockServer::start();
    mock_signature_mismatch(&server, Environment::Sandbox);

    let client = ApiClient::new(sandbox_config(&server)).unwrap();
    let response = client.get_service_status().await.unwrap();

    assert_eq!(response.status, 401);
    let error = response.error_response().unwrap();
    assert_eq!(error.code, "SignatureDoesNotMatch");
    assert_eq!(error.error_type.as_deref(), Some("Sender"));
    assert_eq!(
        error.request_id.as_deref(),
        Some("7e3b2c1a-0f4d-4a8e-9b1c-2d3e4f5a6b7c")
    );
}

#[tokio::test]
async fn test_api_client_missing_secret_key() {
    let server = MockServer::start();
    let mut config = sandbox_config(&server);
    config.secret_key = None;

    let client = ApiClient::new(config).unwrap();
    let err = client.get_service_status().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("secret key"));
}

#[tokio::test]
async fn test_proxy_receives_basic_credentials() {
    let proxy = MockServer::start();
    let mock = proxy.mock(|when, then| {
        when.method(GET)
            .path("/status")
            .header("proxy-authorization", "Basic dXNlcjpwYXNz");
        then.status(200).body("via proxy");
    });

    let config = ClientConfig::new(Region::Us, Environment::Live)
        .with_proxy(ProxyConfig::new(proxy.host(), proxy.port()).with_credentials("user", "pass"));
    let dispatcher = HttpDispatcher::from_config(&config).unwrap();
    let request = SigningRequest::parse(Method::GET, "http://mws.example.invalid/status").unwrap();
    let response = dispatcher.send(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "via proxy");
    mock.assert_hits(1);
}

#[tokio::test]
async fn test_proxy_without_password_sends_no_credentials() {
    let proxy = MockServer::start();
    let with_auth = proxy.mock(|when, then| {
        when.method(GET)
            .path("/status")
            .header_exists("proxy-authorization");
        then.status(200).body("via proxy");
    });

    let mut proxy_config = ProxyConfig::new(proxy.host(), proxy.port());
    proxy_config.username = Some("user".to_string());
    let config = ClientConfig::new(Region::Us, Environment::Live).with_proxy(proxy_config);
    let dispatcher = HttpDispatcher::from_config(&config).unwrap();
    let request = SigningRequest::parse(Method::GET, "http://mws.example.invalid/status").unwrap();
    let response = dispatcher.send(&request).await.unwrap();

    // Routed through the proxy (the host does not resolve), but unmatched.
    assert_eq!(response.status, 404);
    with_auth.assert_hits(0);
}

#[tokio::test]
async fn test_zero_timeout_is_rejected_before_sending() {
    let config = ClientConfig::new(Region::Us, Environment::Live).with_timeout(0);
    let err = HttpDispatcher::from_config(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!err.is_retryable());
}
