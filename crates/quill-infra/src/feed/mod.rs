//! Upstream feed sources - Blogger over HTTP and a static in-memory fallback.

mod memory;

#[cfg(feature = "http-feed")]
mod blogger;

pub use memory::StaticFeedSource;

#[cfg(feature = "http-feed")]
pub use blogger::{BloggerConfig, BloggerFeedSource};
