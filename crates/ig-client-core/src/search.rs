//! Search and infinite-scroll pagination.

use crate::error::GalleryError;
use crate::feed::FeedState;
use ig_api_types::WalletAddress;
use ig_gateway::{ApiGateway, SearchQuery};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is still outstanding.
    InFlight,
    /// The last page said there is nothing further.
    Exhausted,
    /// The controller was closed.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { added: usize },
    Skipped(SkipReason),
    /// The response arrived after a newer search or `close()` and was dropped.
    Discarded,
}

pub struct SearchController {
    gateway: Rc<dyn ApiGateway>,
    state: RefCell<Rc<FeedState>>,
    page_size: Option<u32>,
    // Bumped by every search and by close(); a response is only applied if
    // the generation it was issued under is still current.
    generation: Cell<u64>,
    in_flight: Cell<Option<u64>>,
    closed: Cell<bool>,
}

impl SearchController {
    pub fn new(gateway: Rc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            state: RefCell::new(Rc::new(FeedState::default())),
            page_size: None,
            generation: Cell::new(0),
            in_flight: Cell::new(None),
            closed: Cell::new(false),
        }
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn state(&self) -> Rc<FeedState> {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.get().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Run a query. A blank query restarts the random feed; anything else is
    /// a one-shot similarity search that disables further pages.
    pub async fn search(
        &self,
        query: &str,
        account: Option<&WalletAddress>,
    ) -> Result<FetchOutcome, GalleryError> {
        if self.closed.get() {
            return Ok(FetchOutcome::Skipped(SkipReason::Closed));
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.in_flight.set(Some(generation));

        // A blank query restarts the feed from no seed. The current items
        // stay in place until the first page arrives.
        let text = query.trim();
        let request = if text.is_empty() {
            SearchQuery::feed(account.cloned(), None)
        } else {
            SearchQuery::text(text, account.cloned())
        };
        let request = request.with_num_results(self.page_size);

        debug!(
            "search issued (query={:?}, generation={generation})",
            request.text
        );
        let result = self.gateway.search(&request).await;

        if !self.settle(generation) {
            debug!("discarding stale search response (generation={generation})");
            return Ok(FetchOutcome::Discarded);
        }

        let page = result.map_err(|err| {
            warn!("search failed: {err}");
            GalleryError::SearchFailed(err)
        })?;

        let added = page.items.len();
        let next = if text.is_empty() {
            FeedState::first_feed_page(page)
        } else {
            FeedState::query_results(text, page)
        };
        info!(
            "search applied: {added} results, has_more={}",
            next.has_more()
        );
        self.replace(next);

        Ok(FetchOutcome::Applied { added })
    }

    /// Fetch the next feed page using the most recent continuation token.
    pub async fn load_more(
        &self,
        account: Option<&WalletAddress>,
    ) -> Result<FetchOutcome, GalleryError> {
        if self.closed.get() {
            return Ok(FetchOutcome::Skipped(SkipReason::Closed));
        }
        if self.in_flight.get().is_some() {
            debug!("load_more ignored: fetch already in flight");
            return Ok(FetchOutcome::Skipped(SkipReason::InFlight));
        }

        let current = self.state();
        if !current.has_more() {
            return Ok(FetchOutcome::Skipped(SkipReason::Exhausted));
        }

        let generation = self.generation.get();
        self.in_flight.set(Some(generation));

        let request = SearchQuery::feed(account.cloned(), current.continuation().cloned())
            .with_num_results(self.page_size);
        debug!(
            "load_more issued (seed={:?}, generation={generation})",
            request.random_seed
        );
        let result = self.gateway.search(&request).await;

        if !self.settle(generation) {
            debug!("discarding stale page (generation={generation})");
            return Ok(FetchOutcome::Discarded);
        }

        let page = result.map_err(|err| {
            warn!("load_more failed: {err}");
            GalleryError::SearchFailed(err)
        })?;

        let added = page.items.len();
        let next = self.state().appended(page);
        debug!("page applied: {added} new, {} total", next.len());
        self.replace(next);

        Ok(FetchOutcome::Applied { added })
    }

    /// Stop applying responses; anything still in flight is dropped on arrival.
    pub fn close(&self) {
        self.closed.set(true);
        self.generation.set(self.generation.get() + 1);
        self.in_flight.set(None);
    }

    /// Clears the in-flight marker if `generation` is still current. Returns
    /// whether the response should be applied.
    fn settle(&self, generation: u64) -> bool {
        if self.generation.get() != generation {
            return false;
        }
        self.in_flight.set(None);
        !self.closed.get()
    }

    fn replace(&self, next: FeedState) {
        *self.state.borrow_mut() = Rc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, page, wallet};
    use ig_api_types::RandomSeed;
    use ig_gateway::GatewayError;

    fn controller() -> (Rc<FakeGateway>, SearchController) {
        let gateway = Rc::new(FakeGateway::default());
        let controller = SearchController::new(gateway.clone());
        (gateway, controller)
    }

    #[tokio::test]
    async fn feed_seed_is_used_for_the_next_page() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a", "b"], Some("abc123"))));
        gateway.push_page(Ok(page(&["c"], Some("def456"))));

        controller.search("", None).await.unwrap();
        assert_eq!(
            controller.state().continuation(),
            Some(&RandomSeed::from("abc123"))
        );

        let outcome = controller.load_more(None).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Applied { added: 1 });

        let queries = gateway.queries();
        assert_eq!(queries[0].random_seed, None);
        assert_eq!(queries[1].random_seed, Some(RandomSeed::from("abc123")));
        assert_eq!(queries[1].text, "");

        let state = controller.state();
        let hashes: Vec<&str> = state.items().iter().map(|i| i.hash.as_str()).collect();
        assert_eq!(hashes, ["a", "b", "c"]);
        assert_eq!(state.continuation(), Some(&RandomSeed::from("def456")));
    }

    #[tokio::test]
    async fn blank_query_resets_pagination_before_fetching() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a"], Some("s1"))));
        gateway.push_page(Ok(page(&["b"], Some("s2"))));
        gateway.push_page(Ok(page(&["c"], Some("s3"))));

        controller.search("", None).await.unwrap();
        controller.load_more(None).await.unwrap();
        controller.search("   ", None).await.unwrap();

        let queries = gateway.queries();
        assert_eq!(queries[2].random_seed, None);
        assert_eq!(queries[2].text, "");

        let state = controller.state();
        assert!(state.has_more());
        assert_eq!(state.len(), 1);
        assert_eq!(state.continuation(), Some(&RandomSeed::from("s3")));
    }

    #[tokio::test]
    async fn empty_feed_reports_no_more_pages() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&[], None)));

        controller.search("", None).await.unwrap();

        assert!(!controller.state().has_more());
        assert_eq!(
            controller.load_more(None).await.unwrap(),
            FetchOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(gateway.queries().len(), 1);
    }

    #[tokio::test]
    async fn text_search_is_final_regardless_of_size() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a", "b", "c", "d"], Some("ignored"))));

        let account = wallet("0xab");
        controller.search("  red car ", Some(&account)).await.unwrap();

        let state = controller.state();
        assert!(!state.has_more());
        assert_eq!(state.query(), Some("red car"));
        assert_eq!(state.continuation(), None);

        let queries = gateway.queries();
        assert_eq!(queries[0].text, "red car");
        assert_eq!(queries[0].wallet_address, Some(account));

        assert_eq!(
            controller.load_more(None).await.unwrap(),
            FetchOutcome::Skipped(SkipReason::Exhausted)
        );
    }

    #[tokio::test]
    async fn concurrent_load_more_issues_a_single_fetch() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a"], Some("s1"))));
        controller.search("", None).await.unwrap();

        gateway.push_page(Ok(page(&["b"], Some("s2"))));
        let (first, second) = tokio::join!(controller.load_more(None), controller.load_more(None));

        assert_eq!(first.unwrap(), FetchOutcome::Applied { added: 1 });
        assert_eq!(second.unwrap(), FetchOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(gateway.queries().len(), 2);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn failed_page_keeps_existing_results() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a", "b"], Some("s1"))));
        gateway.push_page(Err(GatewayError::Transport("connection reset".to_owned())));
        controller.search("", None).await.unwrap();

        let err = controller.load_more(None).await.unwrap_err();

        assert!(matches!(err, GalleryError::SearchFailed(_)));
        let state = controller.state();
        assert_eq!(state.len(), 2);
        assert!(state.has_more());
        assert_eq!(state.continuation(), Some(&RandomSeed::from("s1")));
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn failed_text_search_keeps_previous_feed() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a"], Some("s1"))));
        gateway.push_page(Err(GatewayError::Status {
            status: 500,
            body: "index not initialized".to_owned(),
        }));
        controller.search("", None).await.unwrap();

        assert!(controller.search("cats", None).await.is_err());
        assert_eq!(controller.state().len(), 1);
    }

    #[tokio::test]
    async fn failed_feed_restart_keeps_text_results_final() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["cat1", "cat2"], None)));
        gateway.push_page(Err(GatewayError::Transport("offline".to_owned())));
        gateway.push_page(Ok(page(&["rand1"], Some("s1"))));
        controller.search("cats", None).await.unwrap();

        assert!(controller.search("", None).await.is_err());

        let state = controller.state();
        assert!(!state.has_more());
        assert_eq!(state.query(), Some("cats"));
        assert_eq!(state.len(), 2);
        assert_eq!(
            controller.load_more(None).await.unwrap(),
            FetchOutcome::Skipped(SkipReason::Exhausted)
        );
        assert_eq!(gateway.queries().len(), 2);
    }

    #[tokio::test]
    async fn newer_search_discards_outstanding_page() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["a"], Some("s1"))));
        controller.search("", None).await.unwrap();

        gateway.push_page(Ok(page(&["stale"], Some("s2"))));
        gateway.push_page(Ok(page(&["cat"], None)));
        let (more, search) = tokio::join!(controller.load_more(None), controller.search("cats", None));

        assert_eq!(more.unwrap(), FetchOutcome::Discarded);
        assert_eq!(search.unwrap(), FetchOutcome::Applied { added: 1 });

        let state = controller.state();
        assert_eq!(state.len(), 1);
        assert_eq!(state.items()[0].hash.as_str(), "cat");
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn close_drops_late_responses() {
        let (gateway, controller) = controller();
        gateway.push_page(Ok(page(&["late"], Some("s1"))));

        let (outcome, ()) = tokio::join!(controller.search("", None), async {
            controller.close();
        });

        assert_eq!(outcome.unwrap(), FetchOutcome::Discarded);
        assert!(controller.state().is_empty());
        assert_eq!(
            controller.load_more(None).await.unwrap(),
            FetchOutcome::Skipped(SkipReason::Closed)
        );
    }

    #[tokio::test]
    async fn page_size_is_forwarded() {
        let gateway = Rc::new(FakeGateway::default());
        let controller = SearchController::new(gateway.clone()).with_page_size(Some(15));

        controller.search("", None).await.unwrap();

        assert_eq!(gateway.queries()[0].num_results, Some(15));
    }
}
