//! Feed ingestion: paginated fetch, canonicalization, and idempotent bulk insert.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Post, PostStatus, UNCATEGORIZED, first_image_src};
use crate::error::DomainError;
use crate::ports::{FeedError, FeedItem, FeedPage, FeedSource, PostStore};

/// Ingestion tuning, threaded in at construction.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Posts per insert batch.
    pub batch_size: usize,
    /// Total attempts per page for transient failures.
    pub page_attempts: u32,
    /// Backoff before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            page_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Outcome of one `sync` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Raw items received from upstream.
    pub fetched: usize,
    pub inserted: usize,
    /// New items dropped during the run: blank ids, repeats within the feed,
    /// and duplicate-key rejections from concurrent runs.
    pub skipped: usize,
}

/// Outcome of a cover image repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverRepairReport {
    pub updated: usize,
    pub total_checked: usize,
}

/// Pulls posts from the upstream feed into the store without duplicating them.
///
/// Existing posts are never modified by `sync`, so it is safe to run alongside
/// engagement traffic and to re-run after a failure.
pub struct FeedIngestion {
    store: Arc<dyn PostStore>,
    source: Arc<dyn FeedSource>,
    config: IngestionConfig,
}

impl FeedIngestion {
    pub fn new(store: Arc<dyn PostStore>, source: Arc<dyn FeedSource>, config: IngestionConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    /// Fetch every upstream page and insert the posts not yet stored.
    pub async fn sync(&self) -> Result<SyncReport, DomainError> {
        let items = self.fetch_all().await?;
        let fetched = items.len();

        // One bulk read, never a lookup per item.
        let existing = self.store.existing_ids().await?;

        let mut seen = HashSet::new();
        let mut skipped = 0;
        let mut fresh = Vec::new();
        for item in items {
            let id = item.id.trim();
            if id.is_empty() {
                tracing::warn!(title = %item.title, "Skipping feed item without id");
                skipped += 1;
                continue;
            }
            if existing.contains(id) {
                continue;
            }
            if !seen.insert(id.to_string()) {
                skipped += 1;
                continue;
            }
            fresh.push(item);
        }

        let now = Utc::now();
        let posts: Vec<Post> = fresh
            .into_iter()
            .map(|item| canonicalize(item, now))
            .collect();

        let mut inserted = 0;
        for batch in posts.chunks(self.config.batch_size.max(1)) {
            let outcome = self.store.insert_batch(batch.to_vec()).await?;
            inserted += outcome.inserted;
            skipped += outcome.duplicates;
            tracing::debug!(
                batch_len = batch.len(),
                inserted = outcome.inserted,
                duplicates = outcome.duplicates,
                "Inserted ingestion batch"
            );
        }

        let report = SyncReport {
            fetched,
            inserted,
            skipped,
        };
        tracing::info!(
            fetched = report.fetched,
            inserted = report.inserted,
            skipped = report.skipped,
            "Feed sync finished"
        );
        Ok(report)
    }

    /// Fill empty cover images from the first `<img>` in each post's content.
    pub async fn fix_missing_cover_images(&self) -> Result<CoverRepairReport, DomainError> {
        let candidates = self.store.find_missing_cover().await?;
        let mut report = CoverRepairReport {
            updated: 0,
            total_checked: candidates.len(),
        };

        for post in &candidates {
            let Some(src) = first_image_src(&post.content) else {
                continue;
            };
            if self.store.fill_cover_image(&post.post_id, src).await? {
                report.updated += 1;
            }
        }

        tracing::info!(
            updated = report.updated,
            total_checked = report.total_checked,
            "Cover image repair finished"
        );
        Ok(report)
    }

    async fn fetch_all(&self) -> Result<Vec<FeedItem>, DomainError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page = self.fetch_page_with_retry(token.as_deref()).await?;
            items.extend(page.items);

            match page.next_token {
                Some(next) if !next.is_empty() => {
                    if !seen_tokens.insert(next.clone()) {
                        return Err(FeedError::Malformed(format!(
                            "pagination token '{next}' repeated"
                        ))
                        .into());
                    }
                    token = Some(next);
                }
                _ => break,
            }
        }

        Ok(items)
    }

    async fn fetch_page_with_retry(&self, token: Option<&str>) -> Result<FeedPage, FeedError> {
        let attempts = self.config.page_attempts.max(1);
        let mut backoff = self.config.retry_backoff;
        let mut attempt = 1;

        loop {
            match self.source.fetch_page(token).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Feed page fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Feed page fetch failed, aborting sync");
                    return Err(e);
                }
            }
        }
    }
}

/// Map a raw feed item onto a new published post.
fn canonicalize(item: FeedItem, now: DateTime<Utc>) -> Post {
    let content = item.html_content.unwrap_or_default();
    let published_at = item.published.map_or(now, |p| p.with_timezone(&Utc));
    // Calendar date as the blog shows it, before normalizing to UTC.
    let date = item.published.map_or(now.date_naive(), |p| p.date_naive());

    let mut post = Post::new(item.id.trim(), item.title, content, now);
    post.category = item
        .labels
        .first()
        .cloned()
        .unwrap_or_else(|| UNCATEGORIZED.to_string());
    post.tags = item.labels;
    post.cover_image = item.images.into_iter().next().unwrap_or_default();
    post.comments = item.reply_count;
    post.status = PostStatus::Published;
    post.date = Some(date);
    post.published_at = Some(published_at);
    post
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_canonicalize_maps_feed_fields() {
        let now = Utc::now();
        let published = (now - chrono::Duration::days(3)).fixed_offset();
        let item = FeedItem {
            id: "A1".to_string(),
            title: "First".to_string(),
            published: Some(published),
            html_content: Some("<p>Hello <b>world</b></p>".to_string()),
            labels: vec!["poetry".to_string(), "tamil".to_string()],
            images: vec!["https://img.test/1.jpg".to_string()],
            reply_count: 4,
        };

        let post = canonicalize(item, now);
        assert_eq!(post.post_id, "A1");
        assert_eq!(post.excerpt, "Hello world");
        assert_eq!(post.category, "poetry");
        assert_eq!(post.tags, vec!["poetry", "tamil"]);
        assert_eq!(post.cover_image, "https://img.test/1.jpg");
        assert_eq!(post.comments, 4);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, Some(published.with_timezone(&Utc)));
        assert_eq!(post.date, Some(published.date_naive()));
        assert_eq!(post.likes(), 0);
    }

    #[test]
    fn test_canonicalize_defaults() {
        let now = Utc::now();
        let post = canonicalize(
            FeedItem {
                id: "B2".to_string(),
                ..Default::default()
            },
            now,
        );
        assert_eq!(post.excerpt, "");
        assert_eq!(post.category, UNCATEGORIZED);
        assert_eq!(post.cover_image, "");
        assert_eq!(post.published_at, Some(now));
        assert_eq!(post.date, Some(now.date_naive()));
    }

    #[test]
    fn test_canonicalize_keeps_blog_local_date() {
        let published =
            DateTime::parse_from_rfc3339("2024-03-01T20:30:00-08:00").expect("valid instant");
        let post = canonicalize(
            FeedItem {
                id: "C3".to_string(),
                published: Some(published),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(
            post.published_at.map(|p| p.to_rfc3339()),
            Some("2024-03-02T04:30:00+00:00".to_string())
        );
    }
}
