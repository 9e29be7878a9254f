//! Publication scheduler: promotes scheduled posts whose time has come.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::PostStatus;
use crate::error::DomainError;
use crate::ports::PostStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub published_count: usize,
}

/// Moves due posts from `scheduled` to `published`.
///
/// Safe to invoke repeatedly: published posts drop out of the next scan. Each
/// transition is committed on its own, so a failure part-way leaves earlier
/// posts published and the rest scheduled for the next run.
pub struct PublicationScheduler {
    store: Arc<dyn PostStore>,
}

impl PublicationScheduler {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn publish_due(&self, now: DateTime<Utc>) -> Result<PublishReport, DomainError> {
        let due = self.store.scan_due_scheduled(now).await?;
        let mut report = PublishReport::default();

        for post_id in &due {
            // Keeps the stored publish instant; someone else may have moved the post since the scan.
            let moved = self
                .store
                .transition_status(post_id, PostStatus::Scheduled, PostStatus::Published, None)
                .await?;
            if moved {
                report.published_count += 1;
                tracing::info!(post_id = %post_id, "Scheduled post published");
            }
        }

        if !due.is_empty() {
            tracing::info!(
                due = due.len(),
                published = report.published_count,
                "Publication run finished"
            );
        }
        Ok(report)
    }
}
