//! Injected browser wallet (`window.ethereum`, EIP-1193).

use async_trait::async_trait;
use ig_wallet::{WalletError, WalletProvider};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Default, Clone, Copy)]
pub struct EthereumProvider;

impl EthereumProvider {
    /// `None` when the page has no injected wallet.
    pub fn detect() -> Option<Self> {
        injected().map(|_| Self)
    }
}

fn injected() -> Option<Object> {
    let window = web_sys::window()?;
    let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
    if ethereum.is_undefined() || ethereum.is_null() {
        return None;
    }
    ethereum.dyn_into::<Object>().ok()
}

/// Message of a rejected provider request, e.g. "User rejected the request."
fn rejection_message(value: &JsValue) -> String {
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "wallet request failed".to_owned())
}

fn rejected(value: JsValue) -> WalletError {
    WalletError::ConnectionRejected(rejection_message(&value))
}

#[async_trait(?Send)]
impl WalletProvider for EthereumProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let ethereum = injected().ok_or(WalletError::ProviderUnavailable)?;
        let request = Reflect::get(&ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|request| request.dyn_into::<Function>().ok())
            .ok_or(WalletError::ProviderUnavailable)?;

        let args = Object::new();
        Reflect::set(
            &args,
            &JsValue::from_str("method"),
            &JsValue::from_str("eth_requestAccounts"),
        )
        .map_err(rejected)?;

        let pending = request
            .call1(&ethereum, &args)
            .map_err(rejected)?
            .dyn_into::<Promise>()
            .map_err(rejected)?;
        let accounts = JsFuture::from(pending).await.map_err(rejected)?;

        Ok(Array::from(&accounts)
            .iter()
            .filter_map(|account| account.as_string())
            .collect())
    }
}
