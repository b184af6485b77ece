//! The gallery page's session layer in one place.
//!
//! UI events go in, notices come out: every network failure is caught here,
//! logged, and turned into a dismissible notice before being returned.

use crate::error::GalleryError;
use crate::feed::FeedState;
use crate::likes::{LikeReconciler, LikesLoad, ToggleOutcome};
use crate::notice::{Notice, NoticeBoard};
use crate::search::{FetchOutcome, SearchController};
use ig_api_types::{HealthResponse, ImageHash, ImageResult, WalletAddress};
use ig_gateway::ApiGateway;
use ig_storage::SessionStore;
use ig_wallet::{WalletProvider, WalletSession};
use std::rc::Rc;
use tracing::{info, warn};

pub const MSG_CONNECT_WALLET_TO_LIKE: &str = "Please connect your wallet to like images";
pub const MSG_INSTALL_WALLET: &str = "Please install a browser wallet to connect";
pub const MSG_LOAD_FAILED: &str = "Failed to load images";
pub const MSG_LOAD_MORE_FAILED: &str = "Failed to load more images";
pub const MSG_SEARCH_FAILED: &str = "Search failed";
pub const MSG_LIKE_FAILED: &str = "Failed to update like status";
pub const MSG_SERVICE_UNAVAILABLE: &str = "Image service is unavailable";

pub struct GalleryClient<P, S> {
    gateway: Rc<dyn ApiGateway>,
    wallet: WalletSession<P, S>,
    search: SearchController,
    likes: LikeReconciler,
    notices: NoticeBoard,
}

impl<P, S> GalleryClient<P, S>
where
    P: WalletProvider,
    S: SessionStore,
{
    pub fn new(gateway: Rc<dyn ApiGateway>, wallet: WalletSession<P, S>) -> Self {
        Self {
            search: SearchController::new(gateway.clone()),
            likes: LikeReconciler::new(gateway.clone()),
            gateway,
            wallet,
            notices: NoticeBoard::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.search = self.search.with_page_size(page_size);
        self
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.wallet.account()
    }

    pub fn feed(&self) -> Rc<FeedState> {
        self.search.state()
    }

    pub fn is_loading(&self) -> bool {
        self.search.is_loading()
    }

    pub fn is_liked(&self, hash: &ImageHash) -> bool {
        self.likes.is_liked(hash)
    }

    pub fn liked(&self) -> Vec<ImageHash> {
        self.likes.liked()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.list()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Rehydrate a remembered session and its like state.
    pub async fn restore(&self) -> Option<WalletAddress> {
        let account = self.wallet.restore().await?;
        self.refresh_likes(&account).await;
        Some(account)
    }

    /// Page mount: restore the session, then load the first feed page.
    pub async fn start(&self) -> Result<FetchOutcome, GalleryError> {
        self.restore().await;
        self.search("").await
    }

    pub async fn connect(&self) -> Result<WalletAddress, GalleryError> {
        let previous = self.wallet.account();
        let account = match self.wallet.connect().await {
            Ok(account) => account,
            Err(err) => {
                let err = GalleryError::from(err);
                match &err {
                    GalleryError::ConnectionRejected(message) => self.notices.error(message.clone()),
                    _ => self.notices.error(MSG_INSTALL_WALLET),
                };
                return Err(err);
            }
        };

        if previous.as_ref() != Some(&account) {
            self.refresh_likes(&account).await;
        }
        Ok(account)
    }

    pub async fn disconnect(&self) {
        self.wallet.disconnect().await;
        self.likes.reset(None);
    }

    pub async fn search(&self, query: &str) -> Result<FetchOutcome, GalleryError> {
        self.notices.clear_errors();
        let account = self.wallet.account();
        let result = self.search.search(query, account.as_ref()).await;
        if result.is_err() {
            let message = if query.trim().is_empty() {
                MSG_LOAD_FAILED
            } else {
                MSG_SEARCH_FAILED
            };
            self.notices.error(message);
        }
        result
    }

    pub async fn load_more(&self) -> Result<FetchOutcome, GalleryError> {
        let account = self.wallet.account();
        let result = self.search.load_more(account.as_ref()).await;
        if result.is_err() {
            self.notices.error(MSG_LOAD_MORE_FAILED);
        }
        result
    }

    pub async fn toggle_like(&self, hash: &ImageHash) -> Result<ToggleOutcome, GalleryError> {
        let account = self.wallet.account();
        let result = self.likes.toggle_like(account.as_ref(), hash).await;
        match &result {
            Err(GalleryError::AuthRequired) => {
                self.notices.error(MSG_CONNECT_WALLET_TO_LIKE);
            }
            Err(_) => {
                self.notices.error(MSG_LIKE_FAILED);
            }
            Ok(_) => {}
        }
        result
    }

    pub async fn health(&self) -> Result<HealthResponse, GalleryError> {
        self.gateway.health().await.map_err(|err| {
            warn!("health check failed: {err}");
            self.notices.error(MSG_SERVICE_UNAVAILABLE);
            GalleryError::from(err)
        })
    }

    pub async fn list_images(&self) -> Result<Vec<ImageResult>, GalleryError> {
        self.gateway.list_images().await.map_err(|err| {
            warn!("image listing failed: {err}");
            self.notices.error(MSG_LOAD_FAILED);
            GalleryError::from(err)
        })
    }

    /// Page unmount: responses still in flight are dropped when they land.
    pub fn close(&self) {
        self.search.close();
    }

    async fn refresh_likes(&self, account: &WalletAddress) {
        self.likes.reset(Some(account));
        match self.likes.load_likes_for_account(account).await {
            Ok(LikesLoad::Applied(count)) => {
                info!("like state ready for {} ({count} likes)", account.short());
            }
            Ok(LikesLoad::Discarded) => {}
            Err(err) => {
                // browsing keeps working with an empty like set
                warn!(
                    "failed to load likes for {}, continuing without: {err}",
                    account.short()
                );
            }
        }
    }
}
