/*
[INPUT]:  HTTP configuration (base URL, timeouts, API credentials)
[OUTPUT]: Configured reqwest session with signed request builders
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::ApiCredentials;
use crate::http::{EmxError, Result};
use crate::types::Environment;

pub const HEADER_ACCESS_KEY: &str = "EMX-ACCESS-KEY";
pub const HEADER_ACCESS_SIG: &str = "EMX-ACCESS-SIG";
pub const HEADER_ACCESS_TIMESTAMP: &str = "EMX-ACCESS-TIMESTAMP";

const ERROR_BODY_LOG_MAX_BYTES: usize = 512;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Single HTTP session with the EMX REST API.
///
/// Credentials are optional; without them only public market data routes
/// can be used. No client-side rate limiting is performed.
#[derive(Debug, Clone)]
pub struct EmxClient {
    http_client: Client,
    base_url: Url,
    credentials: Option<ApiCredentials>,
}

impl EmxClient {
    /// Create a testnet client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a testnet client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_environment(config, Environment::default())
    }

    /// Create a client for a given EMX deployment
    pub fn with_environment(config: ClientConfig, environment: Environment) -> Result<Self> {
        Self::with_config_and_base_url(config, environment.rest_url())
    }

    /// Create a client against an explicit base URL (proxies, mock servers)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            credentials: None,
        })
    }

    /// Attach credentials, consuming the client
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: ApiCredentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&ApiCredentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Close the session and release pooled connections
    pub fn close(self) {
        debug!(base_url = %self.base_url, "emx session closed");
    }

    /// Send a request to an arbitrary route and return the raw body.
    ///
    /// `endpoint` is the request path including any query string.
    pub async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        authenticated: bool,
    ) -> Result<String> {
        let body = body.map(crate::auth::body_to_string).transpose()?;
        let builder = if authenticated {
            self.signed_request(method, endpoint, body)?
        } else {
            let builder = self.public_request(method, endpoint)?;
            match body {
                Some(body) => builder.body(body),
                None => builder,
            }
        };
        self.send_text(builder).await
    }

    /// Append `endpoint` to the base URL, keeping any path prefix it carries
    fn url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    /// Build request builder for unauthenticated endpoints
    pub(crate) fn public_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        debug!(method = %method, endpoint, "emx public request");
        Ok(self
            .http_client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json"))
    }

    /// Build request builder carrying EMX-ACCESS-* headers.
    ///
    /// The signature covers `endpoint` verbatim (path plus query string) and
    /// exactly the body text that is sent.
    pub(crate) fn signed_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
    ) -> Result<RequestBuilder> {
        let credentials = self.credentials.as_ref().ok_or(EmxError::MissingCredentials)?;
        let url = self.url(endpoint)?;
        let body = body.unwrap_or_default();
        let signed = credentials.sign_request(method.as_str(), endpoint, &body);

        debug!(
            method = %method,
            endpoint,
            timestamp = signed.timestamp,
            body_bytes = body.len(),
            "emx signed request"
        );

        let builder = self
            .http_client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(HEADER_ACCESS_KEY, signed.key)
            .header(HEADER_ACCESS_SIG, signed.signature)
            .header(HEADER_ACCESS_TIMESTAMP, signed.timestamp.to_string());

        Ok(if body.is_empty() {
            builder
        } else {
            builder.body(body)
        })
    }

    /// Send and deserialize a successful JSON response
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send_text(builder).await?;
        serde_json::from_str(&body).map_err(|err| {
            EmxError::InvalidResponse(format!(
                "{err}: {}",
                truncate_for_log(&body, ERROR_BODY_LOG_MAX_BYTES)
            ))
        })
    }

    /// Send and return the body of a 2xx response
    pub(crate) async fn send_text(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                path = %url,
                body = %truncate_for_log(&body, ERROR_BODY_LOG_MAX_BYTES),
                "emx request failed"
            );
            return Err(EmxError::from_response(status, retry_after, &body));
        }

        Ok(body)
    }
}

/// Percent-encode a value used as a single path segment
pub(crate) fn path_segment(value: &str) -> Result<String> {
    let mut scratch = Url::parse("http://localhost/")?;
    scratch
        .path_segments_mut()
        .map_err(|_| EmxError::Config("cannot encode path segment".to_string()))?
        .pop_if_empty()
        .push(value);
    Ok(scratch.path().trim_start_matches('/').to_string())
}

/// Append `pairs` to `path` as a form-encoded query string
pub(crate) fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &value[..end])
}
