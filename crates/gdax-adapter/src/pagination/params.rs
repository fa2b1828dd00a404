/*
[INPUT]:  Page size, continuation tokens and endpoint filters
[OUTPUT]: Query pairs for the next page request
[POS]:    Pagination layer - request parameter encoding
[UPDATE]: When the pagination query contract changes
*/

/// Traversal direction relative to the server's ordering.
///
/// `Next` follows the `after` token (older results), `Prev` follows `before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    /// Query key carrying the continuation token for this direction
    pub fn query_key(&self) -> &'static str {
        match self {
            Direction::Next => "after",
            Direction::Prev => "before",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub limit: Option<u32>,
    pub before: Option<String>,
    pub after: Option<String>,
    /// Endpoint filters repeated on every page, in insertion order
    pub extra: Vec<(String, String)>,
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_before(mut self, token: impl Into<String>) -> Self {
        self.before = Some(token.into());
        self
    }

    pub fn with_after(mut self, token: impl Into<String>) -> Self {
        self.after = Some(token.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Continuation token for `direction`, if one is held
    pub fn token(&self, direction: Direction) -> Option<&str> {
        let token = match direction {
            Direction::Next => self.after.as_deref(),
            Direction::Prev => self.before.as_deref(),
        };
        token.filter(|value| !value.is_empty())
    }

    /// Query pairs for a request in `direction`
    pub fn encode(&self, direction: Direction) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.extra.len() + 2);
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(token) = self.token(direction) {
            query.push((direction.query_key().to_string(), token.to_string()));
        }
        query.extend(self.extra.iter().cloned());
        query
    }
}
