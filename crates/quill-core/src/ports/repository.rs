use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Engagement, Post, PostStatus};
use crate::error::RepoError;

/// Result of a duplicate-tolerant batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchInsertOutcome {
    pub inserted: usize,
    /// Rows rejected because their `post_id` already existed.
    pub duplicates: usize,
}

/// Result of a compare-and-swap engagement write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// The stored version moved on since the caller read it.
    Stale,
}

/// Author-editable fields, written as a whole by [`PostStore::update_content`].
///
/// Ids, status and engagement are not part of an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: String,
}

/// Post store - the persistent record of posts.
///
/// Every single-post write is atomic. No cross-post transactions are offered.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Find a post by its external `post_id`.
    async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>, RepoError>;

    /// Find a post by its local surrogate key.
    async fn find_by_sequential_id(&self, sequential_id: i64) -> Result<Option<Post>, RepoError>;

    /// Every `post_id` currently stored, in one read.
    async fn existing_ids(&self) -> Result<HashSet<String>, RepoError>;

    /// Insert many posts. Rows whose `post_id` already exists are skipped
    /// without affecting the rest of the batch.
    async fn insert_batch(&self, posts: Vec<Post>) -> Result<BatchInsertOutcome, RepoError>;

    /// Insert one post, returning it with its assigned `sequential_id`.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Replace the engagement fields if the stored version still equals
    /// `expected_version`, bumping the version on success.
    async fn update_engagement(
        &self,
        post_id: &str,
        expected_version: i64,
        engagement: &Engagement,
    ) -> Result<UpdateOutcome, RepoError>;

    /// Set the cover image, but only while it is still empty.
    async fn fill_cover_image(&self, post_id: &str, url: &str) -> Result<bool, RepoError>;

    /// Posts with an empty cover image.
    async fn find_missing_cover(&self) -> Result<Vec<Post>, RepoError>;

    /// Ids of scheduled posts whose publish instant is at or before `now`.
    async fn scan_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<String>, RepoError>;

    /// Move a post from `from` to `to`, only if it currently has status `from`.
    /// `published_at` of `None` leaves the stored instant untouched.
    async fn transition_status(
        &self,
        post_id: &str,
        from: PostStatus,
        to: PostStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<bool, RepoError>;

    /// Overwrite the editable fields. `false` when the post does not exist.
    async fn update_content(
        &self,
        post_id: &str,
        update: &ContentUpdate,
    ) -> Result<bool, RepoError>;

    /// Remove a post. `false` when it did not exist.
    async fn delete(&self, post_id: &str) -> Result<bool, RepoError>;

    async fn set_hidden(&self, post_id: &str, hidden: bool) -> Result<bool, RepoError>;

    /// Published posts, newest `published_at` first.
    async fn list_published(&self, include_hidden: bool) -> Result<Vec<Post>, RepoError>;

    /// Distinct categories of published, visible posts, sorted.
    async fn categories(&self) -> Result<Vec<String>, RepoError>;

    async fn count(&self) -> Result<usize, RepoError>;
}
