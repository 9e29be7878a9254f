//! Public post reads and engagement endpoints.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use quill_core::domain::Post;
use quill_shared::dto::{LikesResponse, PostDetail, PostListItem, PostSummary, ViewsResponse};

use crate::middleware::error::AppResult;
use crate::middleware::identity::Caller;
use crate::state::AppState;

fn summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.sequential_id,
        post_id: post.post_id.clone(),
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        excerpt: post.excerpt.clone(),
        category: post.category.clone(),
        tags: post.tags.clone(),
        cover_image: post.cover_image.clone(),
        date: post.date,
        published_at: post.published_at,
        likes: post.likes(),
        views: post.views(),
        comments: post.comments,
    }
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let views = state.authoring.list_for_viewer(&caller.0).await?;
    let body: Vec<PostListItem> = views
        .iter()
        .map(|view| PostListItem {
            summary: summary(&view.post),
            user_liked: view.user_liked,
        })
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.authoring.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/posts/{id}
///
/// `id` is either the post id or the numeric sequential id.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    caller: Caller,
) -> AppResult<HttpResponse> {
    let view = state
        .authoring
        .get_for_viewer(&path, &caller.0, false)
        .await?;

    let post = view.post;
    let detail = PostDetail {
        summary: summary(&post),
        content: post.content,
        status: post.status.to_string(),
        updated_at: post.updated_at,
        user_liked: view.user_liked,
    };
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/post/{id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    caller: Caller,
) -> AppResult<HttpResponse> {
    let likes = state.engagement.like(&path, &caller.0).await?;
    Ok(HttpResponse::Ok().json(LikesResponse { likes }))
}

/// DELETE /api/post/{id}/like
pub async fn unlike_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    caller: Caller,
) -> AppResult<HttpResponse> {
    let likes = state.engagement.unlike(&path, &caller.0).await?;
    Ok(HttpResponse::Ok().json(LikesResponse { likes }))
}

/// POST /api/post/{id}/view
pub async fn record_view(
    state: web::Data<AppState>,
    path: web::Path<String>,
    caller: Caller,
) -> AppResult<HttpResponse> {
    let views = state
        .engagement
        .record_view(&path, &caller.0, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(ViewsResponse { views }))
}
