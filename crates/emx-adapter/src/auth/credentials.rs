/*
[INPUT]:  API key identifier and base64 secret
[OUTPUT]: Signed EMX-ACCESS-* header values and WebSocket auth fields
[POS]:    Auth layer - credential storage and per-request signing
[UPDATE]: When auth header names or the verify route change
*/

use super::signer::{HmacSigner, current_timestamp};
use crate::http::Result;

/// Request path signed when authenticating a WebSocket subscription
pub const WS_VERIFY_PATH: &str = "/v1/user/verify";

/// API key pair used for authenticated requests
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    signer: HmacSigner,
}

/// Values for the three EMX-ACCESS-* headers of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub key: String,
    pub signature: String,
    pub timestamp: u64,
}

impl ApiCredentials {
    /// Create credentials, validating that the secret decodes
    pub fn new(api_key: impl Into<String>, api_secret: &str) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            signer: HmacSigner::new(api_secret)?,
        })
    }

    pub fn signer(&self) -> &HmacSigner {
        &self.signer
    }

    /// Sign a request at the current time
    pub fn sign_request(&self, method: &str, request_path: &str, body: &str) -> SignedHeaders {
        self.sign_request_at(current_timestamp(), method, request_path, body)
    }

    /// Sign a request at an explicit timestamp
    pub fn sign_request_at(
        &self,
        timestamp: u64,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> SignedHeaders {
        SignedHeaders {
            key: self.api_key.clone(),
            signature: self.signer.sign(timestamp, method, request_path, body),
            timestamp,
        }
    }

    /// Signature over `GET /v1/user/verify`, used by WebSocket subscribe
    pub fn sign_ws_verify(&self) -> SignedHeaders {
        self.sign_request("GET", WS_VERIFY_PATH, "")
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
