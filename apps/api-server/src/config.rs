//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "http-feed")]
use quill_infra::BloggerConfig;
#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;

use crate::middleware::identity::IdentityConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "http-feed")]
    pub blogger: Option<BloggerConfig>,
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "http-feed")]
            blogger: BloggerConfig::from_env(),
            identity: IdentityConfig::from_env(),
        }
    }
}
