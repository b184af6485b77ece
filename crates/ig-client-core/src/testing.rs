//! Scripted gateway for unit tests.

use async_trait::async_trait;
use ig_api_types::{
    HealthResponse, ImageHash, ImageResult, LikeAck, RandomSeed, WalletAddress,
};
use ig_gateway::{ApiGateway, GatewayError, SearchPage, SearchQuery, content_url};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};

pub(crate) fn image(hash: &str) -> ImageResult {
    ImageResult {
        hash: ImageHash(hash.to_owned()),
        filename: format!("{hash}.jpg"),
        display_url: content_url("https://content.test", hash),
        similarity: None,
        random_seed: None,
        extension: Some(".jpg".to_owned()),
    }
}

pub(crate) fn page(hashes: &[&str], seed: Option<&str>) -> SearchPage {
    SearchPage {
        items: hashes.iter().map(|hash| image(hash)).collect(),
        random_seed: seed.map(RandomSeed::from),
    }
}

pub(crate) fn hash(value: &str) -> ImageHash {
    ImageHash(value.to_owned())
}

pub(crate) fn wallet(value: &str) -> WalletAddress {
    WalletAddress(value.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LikeCall {
    Like(WalletAddress, ImageHash),
    Unlike(WalletAddress, ImageHash),
}

/// Every call yields to the scheduler once before answering, so futures
/// joined in one task interleave the way UI callbacks do.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pages: RefCell<VecDeque<Result<SearchPage, GatewayError>>>,
    queries: RefCell<Vec<SearchQuery>>,
    like_calls: RefCell<Vec<LikeCall>>,
    failing_hashes: RefCell<HashSet<ImageHash>>,
    user_likes: RefCell<Option<Result<Vec<ImageHash>, GatewayError>>>,
    user_likes_calls: RefCell<Vec<WalletAddress>>,
    service_error: RefCell<Option<GatewayError>>,
}

impl FakeGateway {
    pub(crate) fn push_page(&self, page: Result<SearchPage, GatewayError>) {
        self.pages.borrow_mut().push_back(page);
    }

    pub(crate) fn queries(&self) -> Vec<SearchQuery> {
        self.queries.borrow().clone()
    }

    pub(crate) fn like_calls(&self) -> Vec<LikeCall> {
        self.like_calls.borrow().clone()
    }

    pub(crate) fn fail_likes_for(&self, hash: &str) {
        self.failing_hashes.borrow_mut().insert(ImageHash(hash.to_owned()));
    }

    pub(crate) fn set_user_likes(&self, likes: Result<Vec<ImageHash>, GatewayError>) {
        *self.user_likes.borrow_mut() = Some(likes);
    }

    /// Make `health` and `list_images` fail with `err`.
    pub(crate) fn fail_service(&self, err: GatewayError) {
        *self.service_error.borrow_mut() = Some(err);
    }

    pub(crate) fn user_likes_calls(&self) -> Vec<WalletAddress> {
        self.user_likes_calls.borrow().clone()
    }

    fn like_result(&self, hash: &ImageHash) -> Result<LikeAck, GatewayError> {
        if self.failing_hashes.borrow().contains(hash) {
            return Err(GatewayError::Status {
                status: 500,
                body: "like store unavailable".to_owned(),
            });
        }
        Ok(LikeAck {
            status: Some("success".to_owned()),
            message: None,
        })
    }
}

#[async_trait(?Send)]
impl ApiGateway for FakeGateway {
    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        tokio::task::yield_now().await;
        if let Some(err) = self.service_error.borrow().clone() {
            return Err(err);
        }
        Ok(HealthResponse {
            status: "healthy".to_owned(),
            ..HealthResponse::default()
        })
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, GatewayError> {
        self.queries.borrow_mut().push(query.clone());
        // Answers are matched to calls in issue order, not completion order.
        let answer = self
            .pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchPage::default()));
        tokio::task::yield_now().await;
        answer
    }

    async fn list_images(&self) -> Result<Vec<ImageResult>, GatewayError> {
        tokio::task::yield_now().await;
        if let Some(err) = self.service_error.borrow().clone() {
            return Err(err);
        }
        Ok(vec![image("listed")])
    }

    async fn like(&self, wallet: &WalletAddress, hash: &ImageHash) -> Result<LikeAck, GatewayError> {
        self.like_calls
            .borrow_mut()
            .push(LikeCall::Like(wallet.clone(), hash.clone()));
        tokio::task::yield_now().await;
        self.like_result(hash)
    }

    async fn unlike(&self, wallet: &WalletAddress, hash: &ImageHash) -> Result<LikeAck, GatewayError> {
        self.like_calls
            .borrow_mut()
            .push(LikeCall::Unlike(wallet.clone(), hash.clone()));
        tokio::task::yield_now().await;
        self.like_result(hash)
    }

    async fn user_likes(&self, wallet: &WalletAddress) -> Result<Vec<ImageHash>, GatewayError> {
        self.user_likes_calls.borrow_mut().push(wallet.clone());
        tokio::task::yield_now().await;
        self.user_likes
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
