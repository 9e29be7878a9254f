//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{FeedSource, PostStore};
use quill_core::services::{
    EngagementConfig, EngagementTracker, FeedIngestion, IngestionConfig, PostAuthoring,
    PublicationScheduler,
};
use quill_infra::{InMemoryPostStore, StaticFeedSource};

#[cfg(feature = "http-feed")]
use quill_infra::BloggerFeedSource;
#[cfg(feature = "postgres")]
use quill_infra::PostgresPostStore;

use crate::config::AppConfig;
use crate::middleware::identity::IdentityConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub authoring: Arc<PostAuthoring>,
    pub engagement: Arc<EngagementTracker>,
    pub ingestion: Arc<FeedIngestion>,
    pub publisher: Arc<PublicationScheduler>,
    pub identity: IdentityConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let store = Self::init_store(config).await;
        let source = Self::init_feed(config);
        let state = Self::from_parts(store, source, config.identity.clone());
        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services around an already built store and feed.
    pub fn from_parts(
        store: Arc<dyn PostStore>,
        source: Arc<dyn FeedSource>,
        identity: IdentityConfig,
    ) -> Self {
        Self {
            authoring: Arc::new(PostAuthoring::new(store.clone())),
            engagement: Arc::new(EngagementTracker::new(
                store.clone(),
                EngagementConfig::default(),
            )),
            ingestion: Arc::new(FeedIngestion::new(
                store.clone(),
                source,
                IngestionConfig::default(),
            )),
            publisher: Arc::new(PublicationScheduler::new(store.clone())),
            store,
            identity,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_store(config: &AppConfig) -> Arc<dyn PostStore> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Arc::new(InMemoryPostStore::new());
        };

        match quill_infra::connect(db_config).await {
            Ok(conn) => Arc::new(PostgresPostStore::new(conn)),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Arc::new(InMemoryPostStore::new())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_store(_config: &AppConfig) -> Arc<dyn PostStore> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Arc::new(InMemoryPostStore::new())
    }

    #[cfg(feature = "http-feed")]
    fn init_feed(config: &AppConfig) -> Arc<dyn FeedSource> {
        let Some(blogger) = config.blogger.clone() else {
            tracing::warn!("BLOGGER_BLOG_ID not set. Feed sync will find nothing.");
            return Arc::new(StaticFeedSource::empty());
        };

        match BloggerFeedSource::new(blogger) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                tracing::error!("Failed to build feed client: {}. Using empty feed.", e);
                Arc::new(StaticFeedSource::empty())
            }
        }
    }

    #[cfg(not(feature = "http-feed"))]
    fn init_feed(_config: &AppConfig) -> Arc<dyn FeedSource> {
        tracing::info!("Running without http-feed feature - using empty feed");
        Arc::new(StaticFeedSource::empty())
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory state seeded with `store`, for handler tests.
    /// Trusts `x-user-id` as if behind an authenticating gateway.
    pub fn for_tests(store: Arc<dyn PostStore>) -> Self {
        Self::from_parts(
            store,
            Arc::new(StaticFeedSource::empty()),
            IdentityConfig {
                user_header: Some("x-user-id".to_string()),
                trust_proxy: false,
            },
        )
    }
}
