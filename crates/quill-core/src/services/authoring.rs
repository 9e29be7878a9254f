//! Author-side post lifecycle and viewer-facing reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{EngagementIdentity, Post, PostStatus, UNCATEGORIZED, derive_excerpt};
use crate::error::DomainError;
use crate::ports::{ContentUpdate, PostStore};

/// Input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    /// Requested status. Defaults to published.
    pub status: Option<PostStatus>,
    /// Publish instant. A future instant schedules the post.
    pub publish_at: Option<DateTime<Utc>>,
}

/// Replacement content for an existing post.
///
/// Every field is written; `None` clears the subtitle and cover and resets
/// the category to the default.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// A post as seen by one caller.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub user_liked: bool,
}

pub struct PostAuthoring {
    store: Arc<dyn PostStore>,
}

impl PostAuthoring {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewPost, now: DateTime<Utc>) -> Result<Post, DomainError> {
        require_title_and_content(&input.title, &input.content)?;

        let mut post = Post::new(Uuid::new_v4().to_string(), input.title, input.content, now);
        post.subtitle = input.subtitle;
        if let Some(category) = input.category.filter(|c| !c.trim().is_empty()) {
            post.category = category;
        }
        post.tags = input.tags;
        post.cover_image = input.cover_image.unwrap_or_default();

        let requested = input.status.unwrap_or(PostStatus::Published);
        (post.status, post.published_at) = match (requested, input.publish_at) {
            (PostStatus::Draft, _) => (PostStatus::Draft, None),
            (_, Some(at)) if at > now => (PostStatus::Scheduled, Some(at)),
            (PostStatus::Scheduled, None) => {
                return Err(DomainError::Validation(
                    "A scheduled post needs a publish time".to_string(),
                ));
            }
            (_, at) => (PostStatus::Published, Some(at.unwrap_or(now))),
        };

        let post = self.store.insert(post).await?;
        tracing::info!(post_id = %post.post_id, status = %post.status, "Post created");
        Ok(post)
    }

    /// Replace a post's content. The excerpt is derived again from the new
    /// content; id, status and engagement stay as they are.
    pub async fn update(&self, post_id: &str, edit: PostEdit) -> Result<Post, DomainError> {
        require_title_and_content(&edit.title, &edit.content)?;

        let update = ContentUpdate {
            excerpt: derive_excerpt(&edit.content),
            category: edit
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            title: edit.title,
            subtitle: edit.subtitle,
            content: edit.content,
            tags: edit.tags,
            cover_image: edit.cover_image.unwrap_or_default(),
        };
        if !self.store.update_content(post_id, &update).await? {
            return Err(DomainError::post_not_found(post_id));
        }
        tracing::info!(post_id, "Post updated");
        self.require(post_id).await
    }

    pub async fn delete(&self, post_id: &str) -> Result<(), DomainError> {
        if !self.store.delete(post_id).await? {
            return Err(DomainError::post_not_found(post_id));
        }
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    /// Schedule a post for `at`. An instant that is not in the future publishes now.
    pub async fn schedule(
        &self,
        post_id: &str,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<PostStatus, DomainError> {
        let post = self.require(post_id).await?;
        let target = if at > now {
            PostStatus::Scheduled
        } else {
            PostStatus::Published
        };
        self.transition(&post, target, Some(at)).await?;
        Ok(target)
    }

    /// Publish a draft or scheduled post immediately.
    pub async fn publish(&self, post_id: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        let post = self.require(post_id).await?;
        self.transition(&post, PostStatus::Published, Some(now)).await
    }

    pub async fn set_hidden(&self, post_id: &str, hidden: bool) -> Result<(), DomainError> {
        if !self.store.set_hidden(post_id, hidden).await? {
            return Err(DomainError::post_not_found(post_id));
        }
        tracing::info!(post_id, hidden, "Post visibility changed");
        Ok(())
    }

    /// Look a post up by `post_id`, then by numeric sequential id.
    ///
    /// Posts the viewer may not see are reported as not found.
    pub async fn get_for_viewer(
        &self,
        id: &str,
        identity: &EngagementIdentity,
        viewer_is_author: bool,
    ) -> Result<PostView, DomainError> {
        let mut post = self.store.find_by_id(id).await?;
        if post.is_none() {
            if let Ok(seq) = id.parse::<i64>() {
                post = self.store.find_by_sequential_id(seq).await?;
            }
        }

        let post = post
            .filter(|p| p.is_visible_to(viewer_is_author))
            .ok_or_else(|| DomainError::post_not_found(id))?;
        let user_liked = post.engagement.has_liked(identity);
        Ok(PostView { post, user_liked })
    }

    /// Published, visible posts, newest first, each with the caller's like state.
    pub async fn list_for_viewer(
        &self,
        identity: &EngagementIdentity,
    ) -> Result<Vec<PostView>, DomainError> {
        let posts = self.store.list_published(false).await?;
        Ok(posts
            .into_iter()
            .map(|post| PostView {
                user_liked: post.engagement.has_liked(identity),
                post,
            })
            .collect())
    }

    /// Categories in use by published, visible posts.
    pub async fn categories(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.store.categories().await?)
    }

    async fn require(&self, post_id: &str) -> Result<Post, DomainError> {
        self.store
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    async fn transition(
        &self,
        post: &Post,
        to: PostStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        let from = post.status;
        if !from.can_transition_to(to) {
            return Err(DomainError::InvalidTransition { from, to });
        }
        if !self
            .store
            .transition_status(&post.post_id, from, to, published_at)
            .await?
        {
            // Status changed underneath us; report against what is stored now.
            let current = self.require(&post.post_id).await?.status;
            return Err(DomainError::InvalidTransition { from: current, to });
        }
        tracing::info!(post_id = %post.post_id, %from, %to, "Post status changed");
        Ok(())
    }
}

fn require_title_and_content(title: &str, content: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(DomainError::Validation(
            "Title and content are required".to_string(),
        ));
    }
    Ok(())
}
