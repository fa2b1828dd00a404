/*
[INPUT]:  Product identifiers and pagination parameters
[OUTPUT]: Cursors over public market data collections
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public listings or changing response format
*/

use crate::http::GdaxClient;
use crate::pagination::{Cursor, PaginationParams};
use crate::types::Trade;

impl GdaxClient {
    /// List the latest trades for a product, newest first
    ///
    /// GET /products/{product_id}/trades
    pub fn list_trades(
        &self,
        product_id: &str,
        params: PaginationParams,
    ) -> Cursor<Trade, GdaxClient> {
        let endpoint = format!("/products/{}/trades", urlencoding::encode(product_id));
        Cursor::new(self.clone(), endpoint, params)
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, GdaxClient};
    use crate::pagination::PaginationParams;
    use crate::types::{Side, Trade};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GdaxClient {
        GdaxClient::with_config(ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init")
    }

    #[tokio::test]
    async fn test_list_trades_two_pages() {
        let server = MockServer::start().await;
        let first_page = r#"[
            {"time": "2014-11-07T22:19:28.578544Z", "trade_id": 74, "price": "10.00000000", "size": "0.01000000", "side": "buy"},
            {"time": "2014-11-07T01:08:43.642366Z", "trade_id": 73, "price": "100.00000000", "size": "0.01000000", "side": "sell"}
        ]"#;
        let second_page = r#"[
            {"time": "2014-11-06T10:34:47.123456Z", "trade_id": "72", "price": "99.50000000", "size": "1.50000000", "side": "buy"}
        ]"#;

        Mock::given(method("GET"))
            .and(path("/products/BTC-USD/trades"))
            .and(query_param("after", "73"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(second_page, "application/json"))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products/BTC-USD/trades"))
            .and(query_param("limit", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("CB-BEFORE", "74")
                    .insert_header("CB-AFTER", "73")
                    .set_body_raw(first_page, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cursor = client.list_trades("BTC-USD", PaginationParams::new().with_limit(2));
        let mut trades: Vec<Trade> = Vec::new();
        while cursor.has_more() {
            cursor.next_page(&mut trades).await.expect("next_page failed");
        }

        let ids: Vec<i64> = trades.iter().map(|trade| trade.trade_id).collect();
        assert_eq!(ids, vec![74, 73, 72]);
        assert_eq!(trades[1].side, Side::Sell);
        assert_eq!(trades[2].price, "99.50000000".parse().expect("price"));
    }

    #[tokio::test]
    async fn test_list_trades_escapes_product_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/BTC%2FUSD%3Flimit%3D1/trades"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut cursor = client.list_trades("BTC/USD?limit=1", PaginationParams::new());
        assert_eq!(cursor.path(), "/products/BTC%2FUSD%3Flimit%3D1/trades");

        let mut trades: Vec<Trade> = Vec::new();
        cursor.next_page(&mut trades).await.expect("next_page failed");
        assert!(trades.is_empty());
    }
}
