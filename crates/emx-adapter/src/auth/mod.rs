/*
[INPUT]:  API key and base64 secret
[OUTPUT]: HMAC request signatures and auth header values
[POS]:    Auth layer - handles EMX API authentication
[UPDATE]: When auth flow or signature methods change
*/

pub mod credentials;
pub mod signer;

pub use credentials::{ApiCredentials, SignedHeaders, WS_VERIFY_PATH};
pub use signer::{HmacSigner, body_to_string, current_timestamp};
