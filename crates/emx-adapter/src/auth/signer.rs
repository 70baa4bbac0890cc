/*
[INPUT]:  Base64 API secret, timestamp, method, request path, body text
[OUTPUT]: Base64 HMAC-SHA256 signatures for EMX-ACCESS-SIG
[POS]:    Auth layer - cryptographic signing for request authentication
[UPDATE]: When changing signing algorithm or prehash format
*/

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::http::{EmxError, Result};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer keyed by the decoded API secret
#[derive(Clone)]
pub struct HmacSigner {
    mac: HmacSha256,
}

impl HmacSigner {
    /// Create a signer from the base64 secret issued by EMX
    pub fn new(api_secret: &str) -> Result<Self> {
        let secret = BASE64.decode(api_secret.trim())?;
        let mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| EmxError::Config(format!("Invalid HMAC key: {e}")))?;
        Ok(Self { mac })
    }

    /// Sign a request
    ///
    /// Prehash: "{timestamp}{METHOD}{request_path}{body}"
    /// Returns base64-encoded signature
    pub fn sign(&self, timestamp: u64, method: &str, request_path: &str, body: &str) -> String {
        let message = format!("{timestamp}{}{request_path}{body}", method.to_ascii_uppercase());
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").finish_non_exhaustive()
    }
}

/// Compact JSON encoding used for both the signed prehash and the request body
pub fn body_to_string<T: Serialize + ?Sized>(body: &T) -> Result<String> {
    Ok(serde_json::to_string(body)?)
}

/// Current Unix time in whole seconds
pub fn current_timestamp() -> u64 {
    let now = Utc::now();
    let secs = now.timestamp() + i64::from(now.timestamp_subsec_millis() >= 500);
    secs.max(0) as u64
}
