//! Wallet session management.
//!
//! The wallet itself (a browser extension, a hardware signer, a fixed
//! address on the command line) is reached through [`WalletProvider`]; the
//! session only remembers which account the user connected with.

use async_trait::async_trait;
use ig_api_types::WalletAddress;
use ig_storage::{SessionStore, StoredSession};
use std::cell::RefCell;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("no wallet provider is available")]
    ProviderUnavailable,
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(String),
}

/// Account access on an external wallet.
///
/// Futures are not required to be `Send`: browser providers resolve on the
/// page's event loop.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Ask the wallet for account access. Accounts come back in the wallet's
    /// own preference order.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Provider with a canned answer, for command-line use and tests.
#[derive(Debug, Clone)]
pub struct StaticWalletProvider {
    response: Result<Vec<String>, String>,
}

impl StaticWalletProvider {
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            response: Ok(accounts),
        }
    }

    pub fn single(account: impl Into<String>) -> Self {
        Self::new(vec![account.into()])
    }

    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for StaticWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.response
            .clone()
            .map_err(WalletError::ConnectionRejected)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<WalletAddress>,
}

pub struct WalletSession<P, S> {
    provider: Option<P>,
    store: S,
    session: RefCell<Session>,
}

impl<P, S> WalletSession<P, S>
where
    P: WalletProvider,
    S: SessionStore,
{
    pub fn new(provider: Option<P>, store: S) -> Self {
        Self {
            provider,
            store,
            session: RefCell::new(Session::default()),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.session.borrow().account.clone()
    }

    /// Request account access and make the first returned account active.
    ///
    /// On failure the current session is left as it was.
    pub async fn connect(&self) -> Result<WalletAddress, WalletError> {
        let Some(provider) = &self.provider else {
            warn!("wallet connect requested but no provider is installed");
            return Err(WalletError::ProviderUnavailable);
        };

        let accounts = provider.request_accounts().await.inspect_err(|err| {
            warn!("wallet provider refused account access: {err}");
        })?;

        let Some(first) = accounts.into_iter().next() else {
            return Err(WalletError::ConnectionRejected(
                "wallet returned no accounts".to_owned(),
            ));
        };

        let account = WalletAddress(first);
        self.session.borrow_mut().account = Some(account.clone());
        info!("wallet connected as {}", account.short());

        let record = StoredSession {
            wallet_address: account.0.clone(),
        };
        if let Err(err) = self.store.save(&record).await {
            warn!("failed to persist wallet session: {err:#}");
        }

        Ok(account)
    }

    /// Forget the active account locally. Nothing is revoked on the wallet.
    pub async fn disconnect(&self) {
        let previous = self.session.borrow_mut().account.take();
        if let Some(account) = previous {
            info!("wallet {} disconnected", account.short());
        }

        if let Err(err) = self.store.clear().await {
            warn!("failed to clear persisted wallet session: {err:#}");
        }
    }

    /// Rehydrate the account remembered by the session store, if any.
    pub async fn restore(&self) -> Option<WalletAddress> {
        let stored = match self.store.load().await {
            Ok(stored) => stored?,
            Err(err) => {
                warn!("failed to load persisted wallet session: {err:#}");
                return None;
            }
        };

        if stored.wallet_address.trim().is_empty() {
            debug!("ignoring persisted session with empty wallet address");
            return None;
        }

        let account = WalletAddress(stored.wallet_address);
        self.session.borrow_mut().account = Some(account.clone());
        info!("restored wallet session for {}", account.short());
        Some(account)
    }
}
