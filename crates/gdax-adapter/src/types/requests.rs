/*
[INPUT]:  Caller-supplied listing filters
[OUTPUT]: Query parameters merged into every page request
[POS]:    Data layer - request parameter types for paginated listings
[UPDATE]: When listing endpoints gain new filters
*/

use crate::pagination::PaginationParams;

use super::enums::OrderStatus;

/// Filters for `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOrdersParams {
    /// `None` lists orders in every status
    pub status: Option<OrderStatus>,
    pub product_id: Option<String>,
    pub pagination: PaginationParams,
}

impl ListOrdersParams {
    /// Fold the filters into pagination params as fixed query pairs
    pub fn into_pagination(self) -> PaginationParams {
        let status = self.status.map_or("all", |status| status.as_str());
        let mut pagination = self.pagination.with_extra("status", status);
        if let Some(product_id) = self.product_id {
            pagination = pagination.with_extra("product_id", product_id);
        }
        pagination
    }
}

/// Filters for `GET /fills`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFillsParams {
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub pagination: PaginationParams,
}

impl ListFillsParams {
    pub fn into_pagination(self) -> PaginationParams {
        let mut pagination = self.pagination;
        if let Some(order_id) = self.order_id {
            pagination = pagination.with_extra("order_id", order_id);
        }
        if let Some(product_id) = self.product_id {
            pagination = pagination.with_extra("product_id", product_id);
        }
        pagination
    }
}
