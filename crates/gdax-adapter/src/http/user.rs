/*
[INPUT]:  Listing filters and an authenticating request signer
[OUTPUT]: Cursors over account data (orders, fills, ledger, holds)
[POS]:    HTTP layer - user data endpoints (require signed requests)
[UPDATE]: When adding new user listings or changing query parameters
*/

// ### User Endpoints

use crate::http::GdaxClient;
use crate::pagination::{Cursor, PaginationParams};
use crate::types::{Fill, Hold, LedgerEntry, ListFillsParams, ListOrdersParams, Order};

impl GdaxClient {
    /// List orders; every status unless `params.status` narrows it
    ///
    /// GET /orders?status={status}&product_id={product_id}
    pub fn list_orders(&self, params: ListOrdersParams) -> Cursor<Order, GdaxClient> {
        Cursor::new(self.clone(), "/orders", params.into_pagination())
    }

    /// List fills, optionally for one order or product
    ///
    /// GET /fills?order_id={order_id}&product_id={product_id}
    pub fn list_fills(&self, params: ListFillsParams) -> Cursor<Fill, GdaxClient> {
        Cursor::new(self.clone(), "/fills", params.into_pagination())
    }

    /// List balance changes of an account
    ///
    /// GET /accounts/{account_id}/ledger
    pub fn list_account_ledger(
        &self,
        account_id: &str,
        params: PaginationParams,
    ) -> Cursor<LedgerEntry, GdaxClient> {
        let endpoint = format!("/accounts/{}/ledger", urlencoding::encode(account_id));
        Cursor::new(self.clone(), endpoint, params)
    }

    /// List funds on hold for an account
    ///
    /// GET /accounts/{account_id}/holds
    pub fn list_holds(
        &self,
        account_id: &str,
        params: PaginationParams,
    ) -> Cursor<Hold, GdaxClient> {
        let endpoint = format!("/accounts/{}/holds", urlencoding::encode(account_id));
        Cursor::new(self.clone(), endpoint, params)
    }
}
