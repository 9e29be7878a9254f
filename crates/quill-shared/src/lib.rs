//! # Quill Shared
//!
//! Wire types shared between the HTTP server, the CLI and API clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
