use async_trait::async_trait;
use ig_api_types::{
    HealthResponse, ImageHash, ImageRecord, ImageResult, LikeAck, RandomSeed, SearchHit,
    SearchRequest, SearchResponse, WalletAddress,
};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://mon.adityaberry.me";
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://arnode.asia";

/// Failure talking to the gallery API. Never retried at this layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Display URL of an image on the content-addressed retrieval endpoint.
pub fn content_url(content_base_url: &str, hash: &str) -> String {
    format!("{}/{}", content_base_url.trim_end_matches('/'), hash)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub wallet_address: Option<WalletAddress>,
    pub random_seed: Option<RandomSeed>,
    pub num_results: Option<u32>,
}

impl SearchQuery {
    /// Random/default feed, continued from `random_seed` when given.
    pub fn feed(wallet_address: Option<WalletAddress>, random_seed: Option<RandomSeed>) -> Self {
        Self {
            text: String::new(),
            wallet_address,
            random_seed,
            num_results: None,
        }
    }

    /// Similarity search for `text`.
    pub fn text(text: impl Into<String>, wallet_address: Option<WalletAddress>) -> Self {
        Self {
            text: text.into(),
            wallet_address,
            random_seed: None,
            num_results: None,
        }
    }

    pub fn with_num_results(mut self, num_results: Option<u32>) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            text: self.text.clone(),
            wallet_address: self.wallet_address.as_ref().map(|w| w.0.clone()),
            random_seed: self.random_seed.clone(),
            num_results: self.num_results,
        }
    }
}

/// One page of results as returned by `/search`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<ImageResult>,
    /// Seed reported on the response object itself.
    pub random_seed: Option<RandomSeed>,
}

impl SearchPage {
    pub fn from_response(response: SearchResponse, content_base_url: &str) -> Self {
        Self {
            items: response
                .results
                .into_iter()
                .map(|hit| image_from_hit(hit, content_base_url))
                .collect(),
            random_seed: response.random_seed,
        }
    }

    /// Token for fetching the page after this one: the response-level seed,
    /// falling back to the seed carried by the trailing element.
    pub fn continuation(&self) -> Option<RandomSeed> {
        self.random_seed
            .clone()
            .or_else(|| self.items.last().and_then(|item| item.random_seed.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn image_from_hit(hit: SearchHit, content_base_url: &str) -> ImageResult {
    ImageResult {
        display_url: content_url(content_base_url, &hit.hash),
        hash: ImageHash(hit.hash),
        filename: hit.filename,
        similarity: hit.similarity,
        random_seed: hit.random_seed,
        extension: hit.extension,
    }
}

pub fn image_from_record(record: ImageRecord, content_base_url: &str) -> ImageResult {
    ImageResult {
        display_url: content_url(content_base_url, &record.hash),
        hash: ImageHash(record.hash),
        filename: record.filename,
        similarity: None,
        random_seed: None,
        extension: record.extension,
    }
}

/// Typed access to the gallery HTTP API: one call per operation.
#[async_trait(?Send)]
pub trait ApiGateway {
    async fn health(&self) -> Result<HealthResponse, GatewayError>;
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, GatewayError>;
    async fn list_images(&self) -> Result<Vec<ImageResult>, GatewayError>;
    async fn like(&self, wallet: &WalletAddress, hash: &ImageHash) -> Result<LikeAck, GatewayError>;
    async fn unlike(&self, wallet: &WalletAddress, hash: &ImageHash)
    -> Result<LikeAck, GatewayError>;
    async fn user_likes(&self, wallet: &WalletAddress) -> Result<Vec<ImageHash>, GatewayError>;
}
