//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod feed;
mod repository;

pub use feed::{FeedError, FeedItem, FeedPage, FeedSource};
pub use repository::{BatchInsertOutcome, ContentUpdate, PostStore, UpdateOutcome};
