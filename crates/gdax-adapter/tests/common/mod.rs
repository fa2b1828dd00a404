/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for gdax-adapter tests

#![allow(dead_code)]

use std::sync::Arc;

use gdax_adapter::{ClientConfig, GdaxClient, RequestSigner, Result, SigningInput};
use tokio::sync::mpsc;
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Unauthenticated client pointed at the mock server
pub fn client_for(server: &MockServer) -> GdaxClient {
    GdaxClient::with_config(ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Signer that stamps a fixed key and echoes the signed request path
#[derive(Debug)]
pub struct EchoSigner;

impl RequestSigner for EchoSigner {
    fn sign(&self, input: &SigningInput<'_>) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("CB-ACCESS-KEY".to_string(), "test-key".to_string()),
            ("CB-ACCESS-PASSPHRASE".to_string(), "test-pass".to_string()),
            ("CB-ACCESS-SIGN".to_string(), input.request_path.to_string()),
        ])
    }
}

pub fn signed_client_for(server: &MockServer) -> GdaxClient {
    let config = ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    };
    GdaxClient::with_signer(config, Arc::new(EchoSigner)).expect("client init")
}

/// Fill JSON object with the given trade id
pub fn fill_json(trade_id: i64) -> serde_json::Value {
    serde_json::json!({
        "trade_id": trade_id,
        "product_id": "BTC-USD",
        "price": "10.00",
        "size": "0.01",
        "order_id": "d50ec984-77a8-460a-b958-66f114b0de9b",
        "created_at": "2014-11-07T22:19:28.578544Z",
        "liquidity": "T",
        "fee": "0.00025",
        "settled": true,
        "side": "buy"
    })
}

/// Frame source preloaded with raw feed payloads
pub async fn frames(raw: &[&str]) -> mpsc::Receiver<Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel(raw.len().max(1));
    for frame in raw {
        tx.send(Ok(frame.as_bytes().to_vec())).await.expect("channel open");
    }
    rx
}
