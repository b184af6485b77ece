use anyhow::{Result, anyhow};
use async_trait::async_trait;
use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use ig_storage::{SessionStore, StoredSession};

const SESSION_KEY: &str = "gallery_session";

/// Keeps the connected account in `localStorage` so a reload reconnects.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSessionStore;

#[async_trait]
impl SessionStore for LocalStorageSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        match LocalStorage::get::<StoredSession>(SESSION_KEY) {
            Ok(session) => Ok(Some(session)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(anyhow!("failed to read session: {err}")),
        }
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        LocalStorage::set(SESSION_KEY, session).map_err(|err| anyhow!("failed to save session: {err}"))
    }

    async fn clear(&self) -> Result<()> {
        LocalStorage::delete(SESSION_KEY);
        Ok(())
    }
}
