use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::content::{UNCATEGORIZED, derive_excerpt};
use super::Engagement;

/// Publication status of a post.
///
/// `Published` is terminal: nothing moves a post back out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }

    /// Whether moving from `self` to `next` is a legal status change.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        use PostStatus::*;
        matches!(
            (self, next),
            (Draft, Published)
                | (Draft, Scheduled)
                | (Scheduled, Scheduled)
                | (Scheduled, Draft)
                | (Scheduled, Published)
        )
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// Post entity - the canonical content unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Stable external or locally generated id. Unique and immutable.
    pub post_id: String,
    /// Local surrogate key, assigned by the store on insert (0 until then).
    pub sequential_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Cover image URL, empty when none is known.
    pub cover_image: String,
    pub status: PostStatus,
    /// Invisible to non-authors regardless of status.
    pub hidden: bool,
    /// Display-only content date.
    pub date: Option<NaiveDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub comments: u32,
    pub engagement: Engagement,
    /// Engagement revision used for optimistic concurrency in the store.
    pub version: i64,
}

impl Post {
    /// Create a draft post with derived excerpt and default category.
    pub fn new(
        post_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        Self {
            post_id: post_id.into(),
            sequential_id: 0,
            title: title.into(),
            subtitle: None,
            excerpt: derive_excerpt(&content),
            content,
            category: UNCATEGORIZED.to_string(),
            tags: Vec::new(),
            cover_image: String::new(),
            status: PostStatus::Draft,
            hidden: false,
            date: Some(now.date_naive()),
            published_at: None,
            updated_at: now,
            comments: 0,
            engagement: Engagement::default(),
            version: 0,
        }
    }

    pub fn likes(&self) -> u64 {
        self.engagement.likes()
    }

    pub fn views(&self) -> u64 {
        self.engagement.views()
    }

    /// Scheduled and its publish instant has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Scheduled && self.published_at.is_some_and(|at| at <= now)
    }

    /// Whether a caller may see this post. Authors see everything.
    pub fn is_visible_to(&self, viewer_is_author: bool) -> bool {
        viewer_is_author || (!self.hidden && self.status == PostStatus::Published)
    }
}
