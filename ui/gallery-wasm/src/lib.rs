//! Gallery WASM binding
//!
//! Exposes the gallery client to the page as a `GalleryApp` handle. Every
//! async operation returns a `Promise`; the page renders from `feed()`,
//! `notices()` and `is_liked()` after each one settles.

pub mod ethereum;
pub mod session;

pub use ethereum::EthereumProvider;
pub use session::LocalStorageSessionStore;

use ig_api_types::{ImageHash, ImageResult, RandomSeed};
use ig_client_core::{FetchOutcome, GalleryClient, SkipReason, ToggleOutcome};
use ig_gateway_http::{GatewayConfig, HttpGateway};
use ig_wallet::WalletSession;
use js_sys::Promise;
use serde::Serialize;
use std::fmt::Display;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

type Client = GalleryClient<EthereumProvider, LocalStorageSessionStore>;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn run() {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct FeedView<'a> {
    items: &'a [ImageResult],
    has_more: bool,
    loading: bool,
    query: Option<&'a str>,
    random_seed: Option<&'a RandomSeed>,
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum OutcomeView {
    Applied { added: usize },
    Skipped { reason: &'static str },
    Discarded,
}

impl From<FetchOutcome> for OutcomeView {
    fn from(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Applied { added } => Self::Applied { added },
            FetchOutcome::Skipped(reason) => Self::Skipped {
                reason: match reason {
                    SkipReason::InFlight => "in_flight",
                    SkipReason::Exhausted => "exhausted",
                    SkipReason::Closed => "closed",
                },
            },
            FetchOutcome::Discarded => Self::Discarded,
        }
    }
}

fn to_js(err: impl Display) -> JsValue {
    let message = err.to_string();
    gloo_console::error!(message.clone());
    JsValue::from_str(&message)
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

#[wasm_bindgen]
pub struct GalleryApp {
    client: Rc<Client>,
}

#[wasm_bindgen]
impl GalleryApp {
    /// URLs left out fall back to the built-in service endpoints.
    #[wasm_bindgen(constructor)]
    pub fn new(
        api_base_url: Option<String>,
        content_base_url: Option<String>,
        page_size: Option<u32>,
    ) -> Result<GalleryApp, JsValue> {
        let config = GatewayConfig::new(api_base_url, content_base_url, None);
        let gateway = HttpGateway::new(config).map_err(to_js)?;
        let wallet = WalletSession::new(EthereumProvider::detect(), LocalStorageSessionStore);
        let client = GalleryClient::new(Rc::new(gateway), wallet).with_page_size(page_size);
        Ok(Self {
            client: Rc::new(client),
        })
    }

    /// Page mount: reconnect a remembered wallet, then load the first page.
    pub fn start(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let outcome = client.start().await.map_err(to_js)?;
            to_value(&OutcomeView::from(outcome))
        })
    }

    /// Resolves to the connected address.
    pub fn connect(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let account = client.connect().await.map_err(to_js)?;
            Ok(JsValue::from_str(account.as_str()))
        })
    }

    pub fn disconnect(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            client.disconnect().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn search(&self, query: String) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let outcome = client.search(&query).await.map_err(to_js)?;
            to_value(&OutcomeView::from(outcome))
        })
    }

    #[wasm_bindgen(js_name = loadMore)]
    pub fn load_more(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let outcome = client.load_more().await.map_err(to_js)?;
            to_value(&OutcomeView::from(outcome))
        })
    }

    /// Resolves to `"liked"`, `"unliked"` or `"pending"`.
    #[wasm_bindgen(js_name = toggleLike)]
    pub fn toggle_like(&self, hash: String) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let outcome = client
                .toggle_like(&ImageHash(hash))
                .await
                .map_err(to_js)?;
            let label = match outcome {
                ToggleOutcome::Liked => "liked",
                ToggleOutcome::Unliked => "unliked",
                ToggleOutcome::Pending => "pending",
            };
            Ok(JsValue::from_str(label))
        })
    }

    pub fn health(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let health = client.health().await.map_err(to_js)?;
            to_value(&health)
        })
    }

    #[wasm_bindgen(js_name = listImages)]
    pub fn list_images(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move {
            let images = client.list_images().await.map_err(to_js)?;
            to_value(&images)
        })
    }

    pub fn account(&self) -> Option<String> {
        self.client.account().map(|account| account.0)
    }

    /// `0x1234...abcd` for the navigation bar.
    #[wasm_bindgen(js_name = accountShort)]
    pub fn account_short(&self) -> Option<String> {
        self.client.account().map(|account| account.short())
    }

    #[wasm_bindgen(js_name = accountInitials)]
    pub fn account_initials(&self) -> Option<String> {
        self.client.account().map(|account| account.initials())
    }

    pub fn feed(&self) -> Result<JsValue, JsValue> {
        let feed = self.client.feed();
        to_value(&FeedView {
            items: feed.items(),
            has_more: feed.has_more(),
            loading: self.client.is_loading(),
            query: feed.query(),
            random_seed: feed.continuation(),
        })
    }

    #[wasm_bindgen(js_name = isLiked)]
    pub fn is_liked(&self, hash: String) -> bool {
        self.client.is_liked(&ImageHash(hash))
    }

    pub fn notices(&self) -> Result<JsValue, JsValue> {
        to_value(&self.client.notices())
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.client.dismiss(id)
    }

    /// Page unmount.
    pub fn close(&self) {
        self.client.close();
    }
}
