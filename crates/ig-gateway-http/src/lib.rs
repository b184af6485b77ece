use async_trait::async_trait;
use ig_api_types::{
    HealthResponse, ImageHash, ImageListResponse, ImageResult, LikeAck, LikeRequest,
    SearchResponse, UserLikesResponse, WalletAddress,
};
use ig_gateway::{
    ApiGateway, DEFAULT_API_BASE_URL, DEFAULT_CONTENT_BASE_URL, GatewayError, SearchPage,
    SearchQuery, image_from_record,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoints and limits for [`HttpGateway`].
///
/// Each value is taken from the explicit argument, then from the environment
/// (`GALLERY_API_URL`, `GALLERY_CONTENT_URL`, `GALLERY_HTTP_TIMEOUT_SECS`),
/// then from the built-in default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_base_url: String,
    pub content_base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl GatewayConfig {
    pub fn new(
        api_base_url: Option<String>,
        content_base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let api_base_url = api_base_url
            .or_else(|| std::env::var("GALLERY_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let content_base_url = content_base_url
            .or_else(|| std::env::var("GALLERY_CONTENT_URL").ok())
            .unwrap_or_else(|| DEFAULT_CONTENT_BASE_URL.to_string());
        let timeout = timeout
            .or_else(|| {
                std::env::var("GALLERY_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|raw| raw.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
            })
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            content_base_url: content_base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

/// `reqwest` client for the gallery API.
pub struct HttpGateway {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let http = builder
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, GatewayError> {
        let base = &self.config.api_base_url;
        let mut url = reqwest::Url::parse(base)
            .map_err(|err| GatewayError::Endpoint(format!("{base}: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::Endpoint(format!("{base}: cannot be a base URL")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, op: &str, segments: &[&str]) -> Result<T, GatewayError> {
        let url = self.url(segments)?;
        debug!("{op}: GET {url}");
        let response = self.http.get(url).send().await.map_err(|err| {
            warn!("{op} transport: {err}");
            GatewayError::Transport(err.to_string())
        })?;
        decode(op, response).await
    }

    async fn post<B, T>(&self, op: &str, segments: &[&str], body: &B) -> Result<T, GatewayError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        debug!("{op}: POST {url}");
        let response = self.http.post(url).json(body).send().await.map_err(|err| {
            warn!("{op} transport: {err}");
            GatewayError::Transport(err.to_string())
        })?;
        decode(op, response).await
    }
}

async fn decode<T: DeserializeOwned>(op: &str, response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| GatewayError::Transport(err.to_string()))?;

    if !status.is_success() {
        warn!("{op} HTTP {status}: {text}");
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|err| {
        warn!("{op} parse: {err}");
        GatewayError::Decode(err.to_string())
    })
}

#[async_trait(?Send)]
impl ApiGateway for HttpGateway {
    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        self.get("health", &["health"]).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, GatewayError> {
        let body = query.to_request();
        let response: SearchResponse = self.post("search", &["search"], &body).await?;
        Ok(SearchPage::from_response(response, &self.config.content_base_url))
    }

    async fn list_images(&self) -> Result<Vec<ImageResult>, GatewayError> {
        let response: ImageListResponse = self.get("list_images", &["images"]).await?;
        Ok(response
            .images
            .into_iter()
            .map(|record| image_from_record(record, &self.config.content_base_url))
            .collect())
    }

    async fn like(&self, wallet: &WalletAddress, hash: &ImageHash) -> Result<LikeAck, GatewayError> {
        let body = LikeRequest {
            wallet_address: wallet.0.clone(),
            image_hash: hash.0.clone(),
        };
        self.post("like", &["like"], &body).await
    }

    async fn unlike(&self, wallet: &WalletAddress, hash: &ImageHash) -> Result<LikeAck, GatewayError> {
        let body = LikeRequest {
            wallet_address: wallet.0.clone(),
            image_hash: hash.0.clone(),
        };
        self.post("unlike", &["unlike"], &body).await
    }

    async fn user_likes(&self, wallet: &WalletAddress) -> Result<Vec<ImageHash>, GatewayError> {
        let response: UserLikesResponse = self
            .get("user_likes", &["user", wallet.as_str(), "likes"])
            .await?;
        Ok(response.liked_images.into_iter().map(ImageHash).collect())
    }
}
