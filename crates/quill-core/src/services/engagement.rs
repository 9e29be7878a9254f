//! Engagement tracking: like toggles and windowed view counting.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::locks::KeyedLocks;
use crate::domain::{Engagement, EngagementIdentity};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostStore, UpdateOutcome};

/// Engagement rules, threaded in at construction.
#[derive(Debug, Clone)]
pub struct EngagementConfig {
    /// Repeat views from one identity inside this window are not counted.
    pub view_window: Duration,
    /// Compare-and-swap attempts before giving up on a contended post.
    pub max_attempts: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            view_window: Duration::hours(6),
            max_attempts: 5,
        }
    }
}

/// Applies likes and views to posts.
///
/// Mutations of one post are serialized by a per-post lock inside this process
/// and by a version check in the store across processes. Different posts
/// proceed in parallel.
pub struct EngagementTracker {
    store: Arc<dyn PostStore>,
    locks: KeyedLocks,
    config: EngagementConfig,
}

impl EngagementTracker {
    pub fn new(store: Arc<dyn PostStore>, config: EngagementConfig) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Like a post. Liking twice is a no-op. Returns the like count.
    pub async fn like(&self, post_id: &str, identity: &EngagementIdentity) -> Result<u64, DomainError> {
        let engagement = self.mutate(post_id, |e| e.like(identity)).await?;
        tracing::debug!(post_id, identity = %identity, likes = engagement.likes(), "Like applied");
        Ok(engagement.likes())
    }

    /// Remove a like. Unliking without a like is a no-op. Returns the like count.
    pub async fn unlike(&self, post_id: &str, identity: &EngagementIdentity) -> Result<u64, DomainError> {
        let engagement = self.mutate(post_id, |e| e.unlike(identity)).await?;
        tracing::debug!(post_id, identity = %identity, likes = engagement.likes(), "Unlike applied");
        Ok(engagement.likes())
    }

    /// Count a view at `now`, unless this identity already viewed within the
    /// window. Returns the view count.
    pub async fn record_view(
        &self,
        post_id: &str,
        identity: &EngagementIdentity,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let window = self.config.view_window;
        let engagement = self
            .mutate(post_id, |e| e.record_view(identity, now, window))
            .await?;
        Ok(engagement.views())
    }

    /// Whether `identity` currently likes the post.
    pub async fn has_liked(&self, post_id: &str, identity: &EngagementIdentity) -> Result<bool, DomainError> {
        let post = self
            .store
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(post.engagement.has_liked(identity))
    }

    /// Read-modify-write of one post's engagement.
    ///
    /// `apply` returns whether it changed anything; unchanged state is not written.
    async fn mutate<F>(&self, post_id: &str, apply: F) -> Result<Engagement, DomainError>
    where
        F: Fn(&mut Engagement) -> bool,
    {
        let _guard = self.locks.lock(post_id).await;
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            let post = self
                .store
                .find_by_id(post_id)
                .await?
                .ok_or_else(|| DomainError::post_not_found(post_id))?;

            let mut engagement = post.engagement;
            if !apply(&mut engagement) {
                return Ok(engagement);
            }

            match self
                .store
                .update_engagement(post_id, post.version, &engagement)
                .await
            {
                Ok(UpdateOutcome::Applied) => return Ok(engagement),
                Ok(UpdateOutcome::Stale) => {
                    tracing::debug!(post_id, attempt, "Engagement write lost a race, retrying");
                }
                Err(RepoError::NotFound) => return Err(DomainError::post_not_found(post_id)),
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(post_id, attempts, "Engagement update kept conflicting");
        Err(RepoError::Conflict(format!("post {post_id} changed concurrently {attempts} times")).into())
    }
}
