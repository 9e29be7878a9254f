//! # Quill Core
//!
//! The domain layer of Quill: posts, engagement identities, and the services
//! that ingest, count, and publish them.
//! This crate contains pure business logic with zero infrastructure dependencies;
//! storage and the upstream feed are reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
