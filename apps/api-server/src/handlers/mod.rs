//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            // Public reads
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("/categories", web::get().to(posts::list_categories))
                    .route("/{id}", web::get().to(posts::get_post)),
            )
            // Engagement
            .service(
                web::scope("/post/{id}")
                    .route("/like", web::post().to(posts::like_post))
                    .route("/like", web::delete().to(posts::unlike_post))
                    .route("/view", web::post().to(posts::record_view)),
            ),
    );
}
