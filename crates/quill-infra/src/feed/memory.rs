//! Static feed source - serves a fixed set of pages from memory.
//!
//! Used when no upstream blog is configured, and as a controllable feed in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use quill_core::ports::{FeedError, FeedItem, FeedPage, FeedSource};

const TOKEN_PREFIX: &str = "page-";

/// Feed source over pre-built pages. Page `n` is addressed by token `page-n`.
#[derive(Default)]
pub struct StaticFeedSource {
    pages: Mutex<Vec<Vec<FeedItem>>>,
    failures: Mutex<VecDeque<FeedError>>,
    calls: AtomicUsize,
}

impl StaticFeedSource {
    /// A feed with no items.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split `items` into pages of `page_size`.
    pub fn new(items: Vec<FeedItem>, page_size: usize) -> Self {
        let source = Self::default();
        source.replace_items(items, page_size);
        source
    }

    /// Replace the upstream content, as if the blog had changed.
    pub fn replace_items(&self, items: Vec<FeedItem>, page_size: usize) {
        let pages = items
            .chunks(page_size.max(1))
            .map(<[FeedItem]>::to_vec)
            .collect();
        *self.pages.lock().unwrap_or_else(|e| e.into_inner()) = pages;
    }

    /// Make the next fetch fail with `error`. Queued failures are consumed in order.
    pub fn push_failure(&self, error: FeedError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(error);
    }

    /// Number of `fetch_page` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch_page(&self, token: Option<&str>) -> Result<FeedPage, FeedError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Err(error);
        }

        let index = match token {
            None => 0,
            Some(t) => t
                .strip_prefix(TOKEN_PREFIX)
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| FeedError::Malformed(format!("unknown page token '{t}'")))?,
        };

        let pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        let items = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| format!("{TOKEN_PREFIX}{}", index + 1));

        Ok(FeedPage { items, next_token })
    }
}
