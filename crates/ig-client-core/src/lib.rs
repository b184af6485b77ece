//! Client-side session layer for the image gallery: wallet session, search
//! pagination and like-state, over an [`ig_gateway::ApiGateway`].
//!
//! Everything here runs on one thread. State lives in `Cell`/`RefCell` so
//! that UI callbacks holding a shared reference can drive it, and no borrow
//! is ever held across an `.await`.

pub mod client;
pub mod error;
pub mod feed;
pub mod likes;
pub mod notice;
pub mod search;

#[cfg(test)]
mod testing;

pub use client::GalleryClient;
pub use error::GalleryError;
pub use feed::FeedState;
pub use likes::{LikeReconciler, LikesLoad, ToggleOutcome};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use search::{FetchOutcome, SearchController, SkipReason};
