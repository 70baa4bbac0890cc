/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod client;
pub mod error;
pub mod keys;
pub mod public;
pub mod trade;

pub use error::{EmxError, Result};

pub use client::{
    ClientConfig, EmxClient, HEADER_ACCESS_KEY, HEADER_ACCESS_SIG, HEADER_ACCESS_TIMESTAMP,
};

#[cfg(test)]
pub(crate) mod test_support;
