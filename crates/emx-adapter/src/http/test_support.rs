/*
[INPUT]:  Mock server requests and a known API secret
[OUTPUT]: Wiremock matcher asserting EMX-ACCESS-* headers are valid
[POS]:    HTTP layer - shared unit test helpers
[UPDATE]: When the signing scheme or auth headers change
*/

use wiremock::{Match, MockServer, Request};

use crate::auth::{ApiCredentials, HmacSigner};
use crate::http::{ClientConfig, EmxClient};

pub const TEST_KEY: &str = "test-key";
pub const TEST_SECRET: &str = "ZW14LXRlc3Qtc2VjcmV0";

pub fn authed_client(server: &MockServer) -> EmxClient {
    EmxClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
        .with_credentials(ApiCredentials::new(TEST_KEY, TEST_SECRET).expect("credentials"))
}

/// Recomputes the signature from the received request and compares it with
/// the EMX-ACCESS-SIG header.
pub struct ValidSignature;

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let header = |name: &str| {
            request
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let (Some(key), Some(signature), Some(timestamp)) = (
            header("emx-access-key"),
            header("emx-access-sig"),
            header("emx-access-timestamp"),
        ) else {
            return false;
        };
        let Ok(timestamp) = timestamp.parse::<u64>() else {
            return false;
        };

        let mut request_path = request.url.path().to_string();
        if let Some(query) = request.url.query() {
            request_path.push('?');
            request_path.push_str(query);
        }
        let body = String::from_utf8_lossy(&request.body);
        let signer = HmacSigner::new(TEST_SECRET).expect("test secret");

        key == TEST_KEY
            && signer.sign(timestamp, request.method.as_str(), &request_path, &body) == signature
    }
}
