use httpmock::prelude::*;
use httpmock::Mock;

use crate::config::Environment;
use crate::endpoint::service_version_name;

pub const SERVICE_STATUS_GREEN: &str = r#"<GetServiceStatusResponse xmlns="http://mws.amazonservices.com/schema/OffAmazonPayments/2013-01-01">
  <GetServiceStatusResult>
    <Status>GREEN</Status>
    <Timestamp>2024-01-02T03:04:05.000Z</Timestamp>
  </GetServiceStatusResult>
  <ResponseMetadata>
    <RequestId>b5b3c1b8-6d3f-4d3a-9c43-6b0b1b1c1d1e</RequestId>
  </ResponseMetadata>
</GetServiceStatusResponse>"#;

pub const SIGNATURE_DOES_NOT_MATCH: &str = r#"<ErrorResponse xmlns="http://mws.amazonservices.com/schema/OffAmazonPayments/2013-01-01">
  <Error>
    <Type>Sender</Type>
    <Code>SignatureDoesNotMatch</Code>
    <Message>The request signature we calculated does not match the signature you provided.</Message>
  </Error>
  <RequestId>7e3b2c1a-0f4d-4a8e-9b1c-2d3e4f5a6b7c</RequestId>
</ErrorResponse>"#;

pub fn mock_get<'a>(server: &'a MockServer, path: &str, status: u16, body: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(status).body(body);
    })
}

pub fn mock_get_service_status(server: &MockServer, environment: Environment) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path(service_version_name(environment))
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body_contains("Action=GetServiceStatus")
            .body_contains("SignatureMethod=HmacSHA256")
            .body_contains("SignatureVersion=2");
        then.status(200)
            .header("content-type", "text/xml")
            .body(SERVICE_STATUS_GREEN);
    })
}

pub fn mock_signature_mismatch(server: &MockServer, environment: Environment) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path(service_version_name(environment));
        then.status(401)
            .header("content-type", "text/xml")
            .body(SIGNATURE_DOES_NOT_MATCH);
    })
}
