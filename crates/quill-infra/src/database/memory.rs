//! In-memory post store - used when no database is configured, and in tests.
//! Note: Data is lost on process restart.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::domain::{Engagement, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{BatchInsertOutcome, ContentUpdate, PostStore, UpdateOutcome};

#[derive(Default)]
struct Inner {
    posts: HashMap<String, Post>,
    next_seq: i64,
}

impl Inner {
    /// Insert unless the id is taken; `None` means it was.
    fn insert(&mut self, mut post: Post) -> Option<&Post> {
        if self.posts.contains_key(&post.post_id) {
            return None;
        }
        self.next_seq += 1;
        post.sequential_id = self.next_seq;
        let key = post.post_id.clone();
        Some(self.posts.entry(key).or_insert(post))
    }
}

/// Post store backed by a `HashMap` behind an async `RwLock`.
///
/// Every write happens under the write lock, which gives per-post atomicity.
#[derive(Default)]
pub struct InMemoryPostStore {
    inner: RwLock<Inner>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>, RepoError> {
        Ok(self.inner.read().await.posts.get(post_id).cloned())
    }

    async fn find_by_sequential_id(&self, sequential_id: i64) -> Result<Option<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .find(|p| p.sequential_id == sequential_id)
            .cloned())
    }

    async fn existing_ids(&self) -> Result<HashSet<String>, RepoError> {
        Ok(self.inner.read().await.posts.keys().cloned().collect())
    }

    async fn insert_batch(&self, posts: Vec<Post>) -> Result<BatchInsertOutcome, RepoError> {
        let mut inner = self.inner.write().await;
        let mut outcome = BatchInsertOutcome::default();
        for post in posts {
            if inner.insert(post).is_some() {
                outcome.inserted += 1;
            } else {
                outcome.duplicates += 1;
            }
        }
        Ok(outcome)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let post_id = post.post_id.clone();
        let mut inner = self.inner.write().await;
        inner
            .insert(post)
            .cloned()
            .ok_or_else(|| RepoError::Constraint(format!("post_id {post_id} already exists")))
    }

    async fn update_engagement(
        &self,
        post_id: &str,
        expected_version: i64,
        engagement: &Engagement,
    ) -> Result<UpdateOutcome, RepoError> {
        let mut inner = self.inner.write().await;
        let post = inner.posts.get_mut(post_id).ok_or(RepoError::NotFound)?;
        if post.version != expected_version {
            return Ok(UpdateOutcome::Stale);
        }
        post.engagement = engagement.clone();
        post.version += 1;
        Ok(UpdateOutcome::Applied)
    }

    async fn fill_cover_image(&self, post_id: &str, url: &str) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        match inner.posts.get_mut(post_id) {
            Some(post) if post.cover_image.is_empty() => {
                post.cover_image = url.to_string();
                post.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_missing_cover(&self) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| p.cover_image.is_empty())
            .cloned()
            .collect())
    }

    async fn scan_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<String>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| p.is_due(now))
            .map(|p| p.post_id.clone())
            .collect())
    }

    async fn transition_status(
        &self,
        post_id: &str,
        from: PostStatus,
        to: PostStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        match inner.posts.get_mut(post_id) {
            Some(post) if post.status == from => {
                post.status = to;
                if let Some(at) = published_at {
                    post.published_at = Some(at);
                }
                post.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_content(
        &self,
        post_id: &str,
        update: &ContentUpdate,
    ) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        let Some(post) = inner.posts.get_mut(post_id) else {
            return Ok(false);
        };
        post.title = update.title.clone();
        post.subtitle = update.subtitle.clone();
        post.content = update.content.clone();
        post.excerpt = update.excerpt.clone();
        post.category = update.category.clone();
        post.tags = update.tags.clone();
        post.cover_image = update.cover_image.clone();
        post.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, post_id: &str) -> Result<bool, RepoError> {
        Ok(self.inner.write().await.posts.remove(post_id).is_some())
    }

    async fn set_hidden(&self, post_id: &str, hidden: bool) -> Result<bool, RepoError> {
        let mut inner = self.inner.write().await;
        match inner.posts.get_mut(post_id) {
            Some(post) => {
                post.hidden = hidden;
                post.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_published(&self, include_hidden: bool) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.status == PostStatus::Published && (include_hidden || !p.hidden))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(posts)
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        let inner = self.inner.read().await;
        let categories: BTreeSet<&str> = inner
            .posts
            .values()
            .filter(|p| p.is_visible_to(false))
            .map(|p| p.category.as_str())
            .collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }

    async fn count(&self) -> Result<usize, RepoError> {
        Ok(self.inner.read().await.posts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str) -> Post {
        Post::new(id, "Title", "<p>Body</p>", Utc::now())
    }

    #[tokio::test]
    async fn test_insert_batch_tolerates_duplicates() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();

        let outcome = store
            .insert_batch(vec![post("a"), post("b"), post("b"), post("c")])
            .await
            .unwrap();
        assert_eq!(outcome, BatchInsertOutcome { inserted: 2, duplicates: 2 });
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sequential_ids_are_assigned() {
        let store = InMemoryPostStore::new();
        let first = store.insert(post("a")).await.unwrap();
        let second = store.insert(post("b")).await.unwrap();
        assert_eq!(first.sequential_id, 1);
        assert_eq!(second.sequential_id, 2);

        let found = store.find_by_sequential_id(2).await.unwrap().unwrap();
        assert_eq!(found.post_id, "b");
        assert!(matches!(store.insert(post("a")).await, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_update_engagement_checks_version() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();

        let engagement = Engagement::default();
        assert_eq!(
            store.update_engagement("a", 0, &engagement).await.unwrap(),
            UpdateOutcome::Applied
        );
        assert_eq!(
            store.update_engagement("a", 0, &engagement).await.unwrap(),
            UpdateOutcome::Stale
        );
        assert!(matches!(
            store.update_engagement("missing", 0, &engagement).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_fill_cover_image_only_when_empty() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();

        assert!(store.fill_cover_image("a", "one.jpg").await.unwrap());
        assert!(!store.fill_cover_image("a", "two.jpg").await.unwrap());
        let stored = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(stored.cover_image, "one.jpg");
    }

    #[tokio::test]
    async fn test_transition_status_is_conditional() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();

        assert!(!store
            .transition_status("a", PostStatus::Scheduled, PostStatus::Published, None)
            .await
            .unwrap());
        assert!(store
            .transition_status("a", PostStatus::Draft, PostStatus::Published, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_content_keeps_engagement_and_status() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();
        let mut liked = Engagement::default();
        liked.like(&quill_core::domain::EngagementIdentity::User("u1".to_string()));
        store.update_engagement("a", 0, &liked).await.unwrap();

        let update = ContentUpdate {
            title: "New title".to_string(),
            subtitle: Some("Sub".to_string()),
            content: "<p>New body</p>".to_string(),
            excerpt: "New body".to_string(),
            category: "Rust".to_string(),
            tags: vec!["async".to_string()],
            cover_image: "cover.jpg".to_string(),
        };
        assert!(store.update_content("a", &update).await.unwrap());
        assert!(!store.update_content("missing", &update).await.unwrap());

        let stored = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(stored.title, "New title");
        assert_eq!(stored.category, "Rust");
        assert_eq!(stored.sequential_id, 1);
        assert_eq!(stored.status, PostStatus::Draft);
        assert_eq!(stored.likes(), 1);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_post() {
        let store = InMemoryPostStore::new();
        store.insert(post("a")).await.unwrap();

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.find_by_id("a").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_categories_cover_visible_published_posts() {
        let store = InMemoryPostStore::new();
        for (id, category, status, hidden) in [
            ("a", "Rust", PostStatus::Published, false),
            ("b", "Go", PostStatus::Published, false),
            ("c", "Rust", PostStatus::Published, false),
            ("d", "Drafts", PostStatus::Draft, false),
            ("e", "Secret", PostStatus::Published, true),
        ] {
            let mut p = post(id);
            p.category = category.to_string();
            p.status = status;
            p.hidden = hidden;
            store.insert(p).await.unwrap();
        }

        assert_eq!(store.categories().await.unwrap(), vec!["Go", "Rust"]);
    }
}
