//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Stored post count; absent when the store is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<usize>,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, posts) = match state.store.count().await {
        Ok(count) => ("ok", Some(count)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the post store");
            ("degraded", None)
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        posts,
    };

    HttpResponse::Ok().json(response)
}
