//! Feed source port - the external paginated content API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A raw item as delivered by the upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    /// Publish instant in the blog's own offset.
    pub published: Option<DateTime<FixedOffset>>,
    pub html_content: Option<String>,
    pub labels: Vec<String>,
    pub images: Vec<String>,
    pub reply_count: u32,
}

/// One page of items plus the token for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_token: Option<String>,
}

/// Upstream feed errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),

    #[error("Feed returned HTTP {status}")]
    Http { status: u16 },

    #[error("Malformed feed data: {0}")]
    Malformed(String),
}

impl FeedError {
    /// Worth retrying: network failures, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Http { status } => *status >= 500 || *status == 429,
            Self::Malformed(_) => false,
        }
    }
}

/// Paginated, read-only access to the external content source.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the page addressed by `token` (`None` for the first page).
    async fn fetch_page(&self, token: Option<&str>) -> Result<FeedPage, FeedError>;
}
