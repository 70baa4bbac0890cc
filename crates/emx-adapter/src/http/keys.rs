/*
[INPUT]:  API key identifiers and API key signatures
[OUTPUT]: Key listings, newly minted key pairs, revocation acks
[POS]:    HTTP layer - API key management endpoints (require auth)
[UPDATE]: When key management routes change
*/

use tracing::info;

use crate::http::client::path_segment;
use crate::http::{EmxClient, Result};
use crate::types::{ApiKey, DeleteKeyResponse, KeysResponse};
use reqwest::Method;

impl EmxClient {
    /// List API keys. Secrets are only returned when a key is created.
    ///
    /// GET /v1/keys
    pub async fn list_keys(&self) -> Result<Vec<ApiKey>> {
        let builder = self.signed_request(Method::GET, "/v1/keys", None)?;
        let response: KeysResponse = self.send_json(builder).await?;
        Ok(response.into_keys())
    }

    /// Mint a new API key
    ///
    /// POST /v1/keys
    pub async fn create_key(&self) -> Result<ApiKey> {
        let builder = self.signed_request(Method::POST, "/v1/keys", None)?;
        let key: ApiKey = self.send_json(builder).await?;
        info!(key = %key.key, "api key created");
        Ok(key)
    }

    /// Revoke an existing API key
    ///
    /// DELETE /v1/keys/{key}
    pub async fn delete_key(&self, key: &str) -> Result<DeleteKeyResponse> {
        let endpoint = format!("/v1/keys/{}", path_segment(key)?);
        let builder = self.signed_request(Method::DELETE, &endpoint, None)?;
        let response: DeleteKeyResponse = self.send_json(builder).await?;
        info!(key = %response.key, "api key revoked");
        Ok(response)
    }
}
