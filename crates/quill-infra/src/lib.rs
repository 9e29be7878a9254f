//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains the post stores and the upstream feed clients.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `http-feed` - Blogger feed client via reqwest

pub mod database;
pub mod feed;

// Re-exports - In-Memory
pub use database::InMemoryPostStore;
pub use feed::StaticFeedSource;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostStore, connect};

#[cfg(feature = "http-feed")]
pub use feed::{BloggerConfig, BloggerFeedSource};
