//! Cron-style job scheduler using tokio-cron-scheduler.
//!
//! Runs the publication sweep and the periodic feed sync.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quill_core::services::FeedIngestion;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::state::AppState;

/// Delay before the startup sync, so the server is listening first.
const STARTUP_SYNC_DELAY: Duration = Duration::from_secs(5);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Six-field cron expression for `publish_due`.
    pub publish_cron: String,
    /// Six-field cron expression for the feed sync.
    pub sync_cron: String,
    /// Also sync once shortly after startup.
    pub sync_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            publish_cron: "0 * * * * *".to_string(),
            sync_cron: "0 0 * * * *".to_string(),
            sync_on_startup: false,
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            publish_cron: std::env::var("PUBLISH_CRON").unwrap_or(defaults.publish_cron),
            sync_cron: std::env::var("SYNC_CRON").unwrap_or(defaults.sync_cron),
            sync_on_startup: std::env::var("SYNC_ON_STARTUP")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.sync_on_startup),
        }
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Add a one-shot delayed job.
    pub async fn add_one_shot<F, Fut>(
        &self,
        delay: std::time::Duration,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: FnOnce() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(tokio::sync::Mutex::new(Some(task)));

        let job = Job::new_one_shot_async(delay, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                if let Some(t) = task.lock().await.take() {
                    t().await;
                }
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(delay_secs = delay.as_secs(), job_id = %id, "One-shot job scheduled");
        Ok(id)
    }

    /// Register the publication sweep and feed sync jobs.
    pub async fn register_jobs(&self, state: &AppState) -> Result<(), JobSchedulerError> {
        let publisher = state.publisher.clone();
        self.add_cron(&self.config.publish_cron, move || {
            let publisher = publisher.clone();
            async move {
                match publisher.publish_due(Utc::now()).await {
                    Ok(report) if report.published_count > 0 => {
                        tracing::info!(
                            published = report.published_count,
                            "Scheduled posts published"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Publication sweep failed"),
                }
            }
        })
        .await?;

        let ingestion = state.ingestion.clone();
        self.add_cron(&self.config.sync_cron, move || {
            let ingestion = ingestion.clone();
            async move { run_sync(&ingestion).await }
        })
        .await?;

        if self.config.sync_on_startup {
            let ingestion = state.ingestion.clone();
            self.add_one_shot(STARTUP_SYNC_DELAY, move || async move {
                run_sync(&ingestion).await
            })
            .await?;
        }

        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

async fn run_sync(ingestion: &FeedIngestion) {
    match ingestion.sync().await {
        Ok(report) => tracing::info!(
            fetched = report.fetched,
            inserted = report.inserted,
            skipped = report.skipped,
            "Scheduled feed sync finished"
        ),
        Err(e) => tracing::error!(error = %e, "Scheduled feed sync failed"),
    }
}
