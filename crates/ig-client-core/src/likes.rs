//! Local like set, kept in step with the server's per-account list.
//!
//! Updates are pessimistic: the set changes only once the remote like/unlike
//! call has succeeded, so a failure needs no rollback.

use crate::error::GalleryError;
use ig_api_types::{ImageHash, WalletAddress};
use ig_gateway::ApiGateway;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
    /// A toggle for the same image is still outstanding; nothing was sent.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikesLoad {
    Applied(usize),
    /// The account changed while the list was loading.
    Discarded,
}

pub struct LikeReconciler {
    gateway: Rc<dyn ApiGateway>,
    liked: RefCell<HashSet<ImageHash>>,
    owner: RefCell<Option<WalletAddress>>,
    // Bumped by every reset; a remote answer is only applied if no reset
    // happened while it was outstanding.
    epoch: Cell<u64>,
    pending: RefCell<HashSet<ImageHash>>,
}

impl LikeReconciler {
    pub fn new(gateway: Rc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            liked: RefCell::new(HashSet::new()),
            owner: RefCell::new(None),
            epoch: Cell::new(0),
            pending: RefCell::new(HashSet::new()),
        }
    }

    pub fn is_liked(&self, hash: &ImageHash) -> bool {
        self.liked.borrow().contains(hash)
    }

    /// Liked hashes in sorted order.
    pub fn liked(&self) -> Vec<ImageHash> {
        let mut hashes: Vec<ImageHash> = self.liked.borrow().iter().cloned().collect();
        hashes.sort();
        hashes
    }

    pub fn owner(&self) -> Option<WalletAddress> {
        self.owner.borrow().clone()
    }

    /// Drop every local like and hand the set to `account`.
    pub fn reset(&self, account: Option<&WalletAddress>) {
        self.liked.borrow_mut().clear();
        *self.owner.borrow_mut() = account.cloned();
        self.epoch.set(self.epoch.get() + 1);
    }

    /// Replace the local set with the server's list for `account`.
    ///
    /// On failure the set is left as it was.
    pub async fn load_likes_for_account(
        &self,
        account: &WalletAddress,
    ) -> Result<LikesLoad, GalleryError> {
        if self.owner.borrow().as_ref() != Some(account) {
            self.reset(Some(account));
        }
        let epoch = self.epoch.get();

        let hashes = self.gateway.user_likes(account).await?;

        if self.epoch.get() != epoch {
            debug!("discarding likes for {}: account changed", account.short());
            return Ok(LikesLoad::Discarded);
        }

        let count = hashes.len();
        *self.liked.borrow_mut() = hashes.into_iter().collect();
        info!("loaded {count} likes for {}", account.short());
        Ok(LikesLoad::Applied(count))
    }

    /// Like `hash` if it is not in the set, unlike it otherwise.
    pub async fn toggle_like(
        &self,
        account: Option<&WalletAddress>,
        hash: &ImageHash,
    ) -> Result<ToggleOutcome, GalleryError> {
        let Some(account) = account else {
            return Err(GalleryError::AuthRequired);
        };

        if !self.pending.borrow_mut().insert(hash.clone()) {
            debug!("like toggle for {hash} already in flight");
            return Ok(ToggleOutcome::Pending);
        }

        let owner = self.owner();
        match owner {
            None => *self.owner.borrow_mut() = Some(account.clone()),
            Some(current) if &current != account => self.reset(Some(account)),
            Some(_) => {}
        }
        let epoch = self.epoch.get();

        let was_liked = self.is_liked(hash);
        let result = if was_liked {
            self.gateway.unlike(account, hash).await
        } else {
            self.gateway.like(account, hash).await
        };
        self.pending.borrow_mut().remove(hash);

        if let Err(err) = result {
            warn!("like toggle for {hash} failed: {err}");
            return Err(GalleryError::LikeToggleFailed {
                hash: hash.clone(),
                source: err,
            });
        }

        if self.epoch.get() != epoch {
            debug!("like toggle for {hash} finished after account change; not applied");
            return Ok(if was_liked {
                ToggleOutcome::Unliked
            } else {
                ToggleOutcome::Liked
            });
        }

        let mut liked = self.liked.borrow_mut();
        if was_liked {
            liked.remove(hash);
            Ok(ToggleOutcome::Unliked)
        } else {
            liked.insert(hash.clone());
            Ok(ToggleOutcome::Liked)
        }
    }
}
