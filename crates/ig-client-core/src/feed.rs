//! Pagination state as an immutable value.
//!
//! Every transition builds a new [`FeedState`]; the controller swaps it in
//! whole, so any snapshot handed out stays valid.

use ig_api_types::{ImageResult, RandomSeed};
use ig_gateway::SearchPage;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    items: Vec<ImageResult>,
    has_more: bool,
    continuation: Option<RandomSeed>,
    query: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_more: true,
            continuation: None,
            query: None,
        }
    }
}

impl FeedState {
    pub fn items(&self) -> &[ImageResult] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn continuation(&self) -> Option<&RandomSeed> {
        self.continuation.as_ref()
    }

    /// The text query these results answer; `None` for the feed.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first_feed_page(page: SearchPage) -> Self {
        let continuation = page.continuation();
        Self {
            has_more: !page.items.is_empty(),
            items: page.items,
            continuation,
            query: None,
        }
    }

    /// Text-query results are final: never paginated.
    pub fn query_results(query: &str, page: SearchPage) -> Self {
        Self {
            items: page.items,
            has_more: false,
            continuation: None,
            query: Some(query.to_owned()),
        }
    }

    pub fn appended(&self, page: SearchPage) -> Self {
        if page.items.is_empty() {
            return Self {
                has_more: false,
                ..self.clone()
            };
        }

        let continuation = page.continuation().or_else(|| self.continuation.clone());
        let mut items = Vec::with_capacity(self.items.len() + page.items.len());
        items.extend_from_slice(&self.items);
        items.extend(page.items);

        Self {
            items,
            has_more: true,
            continuation,
            query: self.query.clone(),
        }
    }
}
