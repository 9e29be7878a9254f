//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A post as listed publicly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub post_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: String,
    pub date: Option<NaiveDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub likes: u64,
    pub views: u64,
    pub comments: u32,
}

/// A listed post with the caller's like state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub user_liked: bool,
}

/// A single post with its full content, as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub user_liked: bool,
}

/// Like count after a like or unlike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikesResponse {
    pub likes: u64,
}

/// View count after recording a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: u64,
}

/// Outcome of a feed sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Outcome of a cover image repair pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRepairResponse {
    pub updated: usize,
    pub total_checked: usize,
}

/// Outcome of a publication run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub published_count: usize,
}
