/*
[INPUT]:  PageFetcher implementation, endpoint path, fixed query parameters
[OUTPUT]: Decoded items appended to caller-owned collections, page by page
[POS]:    Pagination layer - forward-only continuation-token cursor
[UPDATE]: When exhaustion rules or the fetcher contract change
*/

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::params::{Direction, PaginationParams};
use crate::http::Result;

/// One page request handed to a [`PageFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub direction: Direction,
}

/// Undecoded page body plus the continuation tokens sent with it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    pub body: Vec<u8>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Performs one round-trip per page.
///
/// Authentication, rate limiting and any retry policy belong to the implementor.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage>;
}

/// Cursor over a server-side paginated collection of `T`.
///
/// Starts in the "has more" state, so the first call always issues a request.
/// Once a page comes back empty or without a continuation token the cursor is
/// exhausted for good; further calls append nothing and succeed.
///
/// A failed fetch or decode leaves the cursor exactly as it was, so the same
/// call can simply be repeated.
#[derive(Debug)]
pub struct Cursor<T, F> {
    fetcher: F,
    path: String,
    params: PaginationParams,
    has_more: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T, F> Cursor<T, F>
where
    T: DeserializeOwned,
    F: PageFetcher,
{
    /// Create a cursor for `path`. Tokens already present in `params` are used
    /// as the starting position, which is how a saved traversal is resumed.
    pub fn new(fetcher: F, path: impl Into<String>, params: PaginationParams) -> Self {
        Self {
            fetcher,
            path: path.into(),
            params,
            has_more: true,
            _item: PhantomData,
        }
    }

    /// Continue a traversal from params saved off an earlier cursor
    pub fn resume(fetcher: F, path: impl Into<String>, saved: &PaginationParams) -> Self {
        Self::new(fetcher, path, saved.clone())
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current position and filters; feed back into [`Cursor::new`] to resume
    pub fn params(&self) -> &PaginationParams {
        &self.params
    }

    pub fn before(&self) -> Option<&str> {
        self.params.token(Direction::Prev)
    }

    pub fn after(&self) -> Option<&str> {
        self.params.token(Direction::Next)
    }

    /// Append the next page (following `after`) to `out`.
    pub async fn next_page<C>(&mut self, out: &mut C) -> Result<()>
    where
        C: Extend<T> + ?Sized,
    {
        self.page(Direction::Next, out).await
    }

    /// Append the previous page (following `before`) to `out`.
    pub async fn prev_page<C>(&mut self, out: &mut C) -> Result<()>
    where
        C: Extend<T> + ?Sized,
    {
        self.page(Direction::Prev, out).await
    }

    pub async fn page<C>(&mut self, direction: Direction, out: &mut C) -> Result<()>
    where
        C: Extend<T> + ?Sized,
    {
        if !self.has_more {
            debug!(path = %self.path, ?direction, "page requested after exhaustion");
            return Ok(());
        }

        let request = PageRequest {
            path: self.path.clone(),
            query: self.params.encode(direction),
            direction,
        };
        let raw = self.fetcher.fetch_page(&request).await?;
        let items: Vec<T> = serde_json::from_slice(&raw.body)?;

        // Nothing above mutates the cursor; commit only after a full decode.
        let count = items.len();
        out.extend(items);
        self.params.before = raw.before;
        self.params.after = raw.after;
        if count == 0 || self.params.token(direction).is_none() {
            self.has_more = false;
        }

        debug!(
            path = %self.path,
            ?direction,
            items = count,
            has_more = self.has_more,
            "page fetched"
        );

        Ok(())
    }

    /// Drain every remaining page in the `Next` direction.
    pub async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while self.has_more {
            self.next_page(&mut items).await?;
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::GdaxError;
    use reqwest::StatusCode;
    use rstest::rstest;
    use serde::Deserialize;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        id: usize,
    }

    #[derive(Debug, Clone, Default)]
    struct ScriptedFetcher {
        responses: Arc<Mutex<VecDeque<Result<RawPage>>>>,
        requests: Arc<Mutex<Vec<PageRequest>>>,
    }

    impl ScriptedFetcher {
        fn push(&self, response: Result<RawPage>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn push_page(&self, start: usize, count: usize, after: Option<&str>) {
            self.push(Ok(page(start, count, after)));
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected page request")
        }
    }

    fn page(start: usize, count: usize, after: Option<&str>) -> RawPage {
        let items: Vec<serde_json::Value> = (start..start + count)
            .map(|id| serde_json::json!({ "id": id }))
            .collect();
        RawPage {
            body: serde_json::to_vec(&items).unwrap(),
            before: Some(format!("before-{start}")),
            after: after.map(str::to_string),
        }
    }

    fn cursor(fetcher: &ScriptedFetcher) -> Cursor<Item, ScriptedFetcher> {
        Cursor::new(fetcher.clone(), "/orders", PaginationParams::new())
    }

    #[tokio::test]
    async fn three_pages_then_exhausted() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(0, 100, Some("t1"));
        fetcher.push_page(100, 100, Some("t2"));
        fetcher.push_page(200, 37, None);

        let mut cursor = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        let mut calls = 0;
        while cursor.has_more() {
            cursor.next_page(&mut items).await.unwrap();
            calls += 1;
        }

        assert_eq!(calls, 3);
        assert_eq!(items.len(), 237);
        assert!(items.iter().enumerate().all(|(idx, item)| item.id == idx));

        let tokens: Vec<Option<String>> = fetcher
            .requests()
            .iter()
            .map(|request| {
                request
                    .query
                    .iter()
                    .find(|(key, _)| key == "after")
                    .map(|(_, value)| value.clone())
            })
            .collect();
        assert_eq!(tokens, vec![None, Some("t1".to_string()), Some("t2".to_string())]);
    }

    #[rstest]
    #[case::empty_first_page(vec![(0, None)], 0, 1)]
    #[case::empty_page_with_token(vec![(2, Some("t1")), (0, Some("t2"))], 2, 2)]
    #[case::items_without_token(vec![(2, Some("t1")), (3, None)], 5, 2)]
    #[case::blank_token(vec![(1, Some("a")), (1, Some("b")), (4, Some(""))], 6, 3)]
    #[tokio::test]
    async fn terminates_on_exhaustion_signal(
        #[case] pages: Vec<(usize, Option<&'static str>)>,
        #[case] expected_items: usize,
        #[case] expected_calls: usize,
    ) {
        let fetcher = ScriptedFetcher::default();
        let mut start = 0;
        for (count, token) in &pages {
            fetcher.push_page(start, *count, *token);
            start += count;
        }

        let mut cursor = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        while cursor.has_more() {
            cursor.next_page(&mut items).await.unwrap();
        }

        assert_eq!(items.len(), expected_items);
        assert_eq!(fetcher.requests().len(), expected_calls);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_untouched() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(0, 2, Some("t1"));
        fetcher.push(Err(GdaxError::api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "service unavailable",
        )));
        fetcher.push_page(2, 2, None);

        let mut cursor = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        cursor.next_page(&mut items).await.unwrap();

        let before_failure = cursor.params().clone();
        let err = cursor.next_page(&mut items).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(cursor.params(), &before_failure);
        assert!(cursor.has_more());
        assert_eq!(items.len(), 2);

        cursor.next_page(&mut items).await.unwrap();
        assert_eq!(items.len(), 4);
        assert!(!cursor.has_more());

        let requests = fetcher.requests();
        assert_eq!(requests[1], requests[2]);
    }

    #[tokio::test]
    async fn undecodable_page_leaves_state_untouched() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push(Ok(RawPage {
            body: br#"[{"id": "not-a-number"}]"#.to_vec(),
            before: None,
            after: Some("t9".to_string()),
        }));

        let mut cursor = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        let err = cursor.next_page(&mut items).await.unwrap_err();

        assert!(err.is_decode());
        assert!(items.is_empty());
        assert!(cursor.has_more());
        assert_eq!(cursor.after(), None);
    }

    #[tokio::test]
    async fn next_page_after_exhaustion_is_noop() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(0, 5, None);

        let mut cursor = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        cursor.next_page(&mut items).await.unwrap();
        assert!(!cursor.has_more());

        cursor.next_page(&mut items).await.unwrap();
        cursor.prev_page(&mut items).await.unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn prev_page_follows_before_token() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push(Ok(RawPage {
            body: br#"[{"id": 7}]"#.to_vec(),
            before: Some("b2".to_string()),
            after: None,
        }));

        let params = PaginationParams::new().with_before("b1").with_limit(1);
        let mut cursor: Cursor<Item, _> = Cursor::new(fetcher.clone(), "/fills", params);
        let mut items: Vec<Item> = Vec::new();
        cursor.prev_page(&mut items).await.unwrap();

        assert_eq!(items, vec![Item { id: 7 }]);
        assert!(cursor.has_more());
        assert_eq!(cursor.before(), Some("b2"));

        let request = &fetcher.requests()[0];
        assert_eq!(request.direction, Direction::Prev);
        assert!(request.query.contains(&("before".to_string(), "b1".to_string())));
        assert!(!request.query.iter().any(|(key, _)| key == "after"));
    }

    #[tokio::test]
    async fn resume_continues_from_saved_position() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(0, 2, Some("t1"));
        fetcher.push_page(2, 2, None);

        let mut first = cursor(&fetcher);
        let mut items: Vec<Item> = Vec::new();
        first.next_page(&mut items).await.unwrap();
        let saved = first.params().clone();
        drop(first);

        let mut resumed: Cursor<Item, _> = Cursor::resume(fetcher.clone(), "/orders", &saved);
        resumed.next_page(&mut items).await.unwrap();

        assert_eq!(items.len(), 4);
        assert!(!resumed.has_more());
        assert!(fetcher.requests()[1]
            .query
            .contains(&("after".to_string(), "t1".to_string())));
    }

    #[tokio::test]
    async fn appends_to_existing_collection() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(10, 2, None);

        let mut cursor = cursor(&fetcher);
        let mut items = vec![Item { id: 99 }];
        cursor.next_page(&mut items).await.unwrap();

        let ids: Vec<usize> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![99, 10, 11]);
    }

    #[tokio::test]
    async fn collect_all_drains_cursor() {
        let fetcher = ScriptedFetcher::default();
        fetcher.push_page(0, 3, Some("t1"));
        fetcher.push_page(3, 3, Some("t2"));
        fetcher.push_page(6, 0, Some("t3"));

        let mut cursor = cursor(&fetcher);
        let items = cursor.collect_all().await.unwrap();

        assert_eq!(items.len(), 6);
        assert!(!cursor.has_more());
    }
}
