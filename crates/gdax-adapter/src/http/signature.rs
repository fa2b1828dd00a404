/*
[INPUT]:  Request method, path with query, body and timestamp
[OUTPUT]: Authentication headers to attach to the outgoing request
[POS]:    HTTP layer - request signing seam for authenticated endpoints
[UPDATE]: When changing what a signer receives or how headers are attached
*/

use std::fmt::Debug;

use reqwest::Method;

use super::error::Result;

/// Everything a signer may cover with its signature
#[derive(Debug, Clone, Copy)]
pub struct SigningInput<'a> {
    pub method: &'a Method,
    /// Path plus query string, e.g. `/orders?status=all`
    pub request_path: &'a str,
    pub body: &'a str,
    /// Unix seconds
    pub timestamp: i64,
}

/// Produces authentication headers for each request.
///
/// Injected per [`GdaxClient`](super::GdaxClient) so different clients can carry
/// different credentials. Return [`GdaxError::Signing`](super::GdaxError::Signing)
/// to abort the request.
pub trait RequestSigner: Send + Sync + Debug {
    fn sign(&self, input: &SigningInput<'_>) -> Result<Vec<(String, String)>>;
}

/// Signer for public endpoints; attaches nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl RequestSigner for NoAuth {
    fn sign(&self, _input: &SigningInput<'_>) -> Result<Vec<(String, String)>> {
        Ok(Vec::new())
    }
}
