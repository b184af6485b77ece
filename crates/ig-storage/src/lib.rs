use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The persisted "who is logged in" record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub wallet_address: String,
}

/// Pluggable persistence for the active wallet session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredSession>>;
    async fn save(&self, session: &StoredSession) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Session lives for the page only; nothing is written anywhere.
#[derive(Default)]
pub struct NoopSessionStore;

#[async_trait]
impl SessionStore for NoopSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        Ok(None)
    }

    async fn save(&self, _session: &StoredSession) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<StoredSession>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        let guard = self.session.read().await;
        Ok(guard.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        let mut guard = self.session.write().await;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.session.write().await;
        *guard = None;
        Ok(())
    }
}

#[cfg(feature = "rocksdb")]
pub use rocks::RocksDbSessionStore;

#[cfg(feature = "rocksdb")]
mod rocks {
    use super::{SessionStore, StoredSession};
    use anyhow::Result;
    use async_trait::async_trait;
    use rocksdb::{DB, Options};
    use std::sync::Arc;

    const ACTIVE_SESSION_KEY: &[u8] = b"session:active";

    pub struct RocksDbSessionStore {
        db: Arc<DB>,
    }

    impl RocksDbSessionStore {
        pub fn open_default(path: &str) -> Result<Self> {
            let mut options = Options::default();
            options.create_if_missing(true);
            let db = DB::open(&options, path)?;
            Ok(Self { db: Arc::new(db) })
        }
    }

    #[async_trait]
    impl SessionStore for RocksDbSessionStore {
        async fn load(&self) -> Result<Option<StoredSession>> {
            match self.db.get(ACTIVE_SESSION_KEY)? {
                Some(raw) => Ok(Some(serde_json::from_slice::<StoredSession>(&raw)?)),
                None => Ok(None),
            }
        }

        async fn save(&self, session: &StoredSession) -> Result<()> {
            let value = serde_json::to_vec(session)?;
            self.db.put(ACTIVE_SESSION_KEY, value)?;
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            self.db.delete(ACTIVE_SESSION_KEY)?;
            Ok(())
        }
    }
}
