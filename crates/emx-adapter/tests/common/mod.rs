/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for emx-adapter tests

use emx_adapter::{ApiCredentials, ClientConfig, EmxClient};
use tokio::net::TcpListener;
use wiremock::MockServer;

pub const TEST_KEY: &str = "integration-key";
/// base64("emx-test-secret")
pub const TEST_SECRET: &str = "ZW14LXRlc3Qtc2VjcmV0";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

#[allow(dead_code)]
pub fn test_credentials() -> ApiCredentials {
    ApiCredentials::new(TEST_KEY, TEST_SECRET).expect("test credentials")
}

/// Client pointed at the mock server, optionally authenticated
#[allow(dead_code)]
pub fn client_for(server: &MockServer, authenticated: bool) -> EmxClient {
    let client = EmxClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init");
    if authenticated {
        client.with_credentials(test_credentials())
    } else {
        client
    }
}

/// Bind a listener on an ephemeral local port and return it with its ws:// URL
#[allow(dead_code)]
pub async fn bind_local_ws() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, format!("ws://{addr}"))
}
