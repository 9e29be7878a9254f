//! Blogger v3 feed client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use quill_core::ports::{FeedError, FeedItem, FeedPage, FeedSource};

/// Blogger API configuration.
#[derive(Debug, Clone)]
pub struct BloggerConfig {
    pub api_base: String,
    pub blog_id: String,
    pub api_key: Option<String>,
    /// `maxResults` per page.
    pub page_size: u32,
    pub timeout: Duration,
}

impl BloggerConfig {
    /// Load from environment. `None` when `BLOGGER_BLOG_ID` is not set.
    pub fn from_env() -> Option<Self> {
        let blog_id = std::env::var("BLOGGER_BLOG_ID").ok()?;
        Some(Self {
            api_base: std::env::var("BLOGGER_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/blogger/v3".to_string()),
            blog_id,
            api_key: std::env::var("BLOGGER_API_KEY").ok(),
            page_size: std::env::var("BLOGGER_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(500),
            timeout: Duration::from_secs(
                std::env::var("FEED_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// Reads posts from the Blogger `posts.list` endpoint.
pub struct BloggerFeedSource {
    client: reqwest::Client,
    config: BloggerConfig,
}

impl BloggerFeedSource {
    pub fn new(config: BloggerConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn posts_url(&self) -> String {
        format!(
            "{}/blogs/{}/posts",
            self.config.api_base.trim_end_matches('/'),
            self.config.blog_id
        )
    }

    /// Query parameters for one `posts.list` call. `fetchImages` is needed for
    /// Blogger to include `images[]` at all.
    fn query(&self, token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("maxResults", self.config.page_size.to_string()),
            ("fetchImages", "true".to_string()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        if let Some(token) = token {
            params.push(("pageToken", token.to_string()));
        }
        params
    }
}

#[async_trait]
impl FeedSource for BloggerFeedSource {
    async fn fetch_page(&self, token: Option<&str>) -> Result<FeedPage, FeedError> {
        let url = self.posts_url();
        tracing::debug!(url = %url, page_token = ?token, "Fetching Blogger page");

        let response = self
            .client
            .get(&url)
            .query(&self.query(token))
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        parse_page(&body)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostList {
    #[serde(default)]
    items: Vec<BloggerPost>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct BloggerPost {
    id: String,
    #[serde(default)]
    title: String,
    published: Option<DateTime<FixedOffset>>,
    content: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    images: Vec<BloggerImage>,
    replies: Option<BloggerReplies>,
}

#[derive(Deserialize)]
struct BloggerImage {
    url: String,
}

#[derive(Deserialize)]
struct BloggerReplies {
    /// Blogger encodes this int64 as a JSON string.
    #[serde(rename = "totalItems")]
    total_items: Option<serde_json::Value>,
}

impl BloggerReplies {
    fn count(&self) -> u32 {
        match &self.total_items {
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
            Some(serde_json::Value::Number(n)) => {
                n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl From<BloggerPost> for FeedItem {
    fn from(post: BloggerPost) -> Self {
        Self {
            reply_count: post.replies.as_ref().map(BloggerReplies::count).unwrap_or(0),
            id: post.id,
            title: post.title,
            published: post.published,
            html_content: post.content,
            labels: post.labels,
            images: post.images.into_iter().map(|img| img.url).collect(),
        }
    }
}

/// Decode one `posts.list` response body.
fn parse_page(body: &str) -> Result<FeedPage, FeedError> {
    let list: PostList =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;
    Ok(FeedPage {
        items: list.items.into_iter().map(Into::into).collect(),
        next_token: list.next_page_token.filter(|t| !t.is_empty()),
    })
}
