//! PostgreSQL post store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use serde_json::json;

use quill_core::domain::{Engagement, Post, PostStatus};
use quill_core::error::RepoError;
use quill_core::ports::{BatchInsertOutcome, ContentUpdate, PostStore, UpdateOutcome};

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post store.
///
/// Batch inserts rely on the unique index on `post_id` (`ON CONFLICT DO NOTHING`);
/// engagement writes are compare-and-swap on the `version` column.
pub struct PostgresPostStore {
    db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn to_domain(models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        models.into_iter().map(Post::try_from).collect()
    }
}

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn fixed(at: DateTime<Utc>) -> sea_orm::prelude::DateTimeWithTimeZone {
    at.into()
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn find_by_id(&self, post_id: &str) -> Result<Option<Post>, RepoError> {
        tracing::debug!(post_id, "Finding post by id");
        PostEntity::find()
            .filter(post::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Post::try_from)
            .transpose()
    }

    async fn find_by_sequential_id(&self, sequential_id: i64) -> Result<Option<Post>, RepoError> {
        PostEntity::find_by_id(sequential_id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Post::try_from)
            .transpose()
    }

    async fn existing_ids(&self) -> Result<HashSet<String>, RepoError> {
        let ids: Vec<String> = PostEntity::find()
            .select_only()
            .column(post::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(ids.into_iter().collect())
    }

    async fn insert_batch(&self, posts: Vec<Post>) -> Result<BatchInsertOutcome, RepoError> {
        if posts.is_empty() {
            return Ok(BatchInsertOutcome::default());
        }

        let attempted = posts.len();
        let models: Vec<post::ActiveModel> = posts.into_iter().map(Into::into).collect();
        let rows = PostEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(post::Column::PostId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;

        let inserted = usize::try_from(rows).unwrap_or(attempted).min(attempted);
        Ok(BatchInsertOutcome {
            inserted,
            duplicates: attempted - inserted,
        })
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let post_id = post.post_id.clone();
        let active: post::ActiveModel = post.into();
        let model = active.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                RepoError::Constraint(format!("post_id {post_id} already exists"))
            }
            _ => query_err(e),
        })?;
        Post::try_from(model)
    }

    async fn update_engagement(
        &self,
        post_id: &str,
        expected_version: i64,
        engagement: &Engagement,
    ) -> Result<UpdateOutcome, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Likes, Expr::value(engagement.likes() as i64))
            .col_expr(post::Column::LikedBy, Expr::value(json!(engagement.liked_by())))
            .col_expr(post::Column::Views, Expr::value(engagement.views() as i64))
            .col_expr(post::Column::ViewedBy, Expr::value(json!(engagement.viewed_by())))
            .col_expr(post::Column::Version, Expr::value(expected_version + 1))
            .filter(post::Column::PostId.eq(post_id))
            .filter(post::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected > 0 {
            return Ok(UpdateOutcome::Applied);
        }

        // Zero rows: either the version moved on or the post is gone.
        match self.find_by_id(post_id).await? {
            Some(_) => Ok(UpdateOutcome::Stale),
            None => Err(RepoError::NotFound),
        }
    }

    async fn fill_cover_image(&self, post_id: &str, url: &str) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::CoverImage, Expr::value(url.to_string()))
            .col_expr(post::Column::UpdatedAt, Expr::value(fixed(Utc::now())))
            .filter(post::Column::PostId.eq(post_id))
            .filter(post::Column::CoverImage.eq(""))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_missing_cover(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::CoverImage.eq(""))
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Self::to_domain(models)
    }

    async fn scan_due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<String>, RepoError> {
        PostEntity::find()
            .select_only()
            .column(post::Column::PostId)
            .filter(post::Column::Status.eq(PostStatus::Scheduled.as_str()))
            .filter(post::Column::PublishedAt.lte(fixed(now)))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(query_err)
    }

    async fn transition_status(
        &self,
        post_id: &str,
        from: PostStatus,
        to: PostStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<bool, RepoError> {
        let mut update = PostEntity::update_many()
            .col_expr(post::Column::Status, Expr::value(to.as_str()))
            .col_expr(post::Column::UpdatedAt, Expr::value(fixed(Utc::now())));
        if let Some(at) = published_at {
            update = update.col_expr(post::Column::PublishedAt, Expr::value(fixed(at)));
        }

        let result = update
            .filter(post::Column::PostId.eq(post_id))
            .filter(post::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_content(
        &self,
        post_id: &str,
        update: &ContentUpdate,
    ) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(update.title.clone()))
            .col_expr(post::Column::Subtitle, Expr::value(update.subtitle.clone()))
            .col_expr(post::Column::Content, Expr::value(update.content.clone()))
            .col_expr(post::Column::Excerpt, Expr::value(update.excerpt.clone()))
            .col_expr(post::Column::Category, Expr::value(update.category.clone()))
            .col_expr(post::Column::Tags, Expr::value(json!(update.tags)))
            .col_expr(post::Column::CoverImage, Expr::value(update.cover_image.clone()))
            .col_expr(post::Column::UpdatedAt, Expr::value(fixed(Utc::now())))
            .filter(post::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, post_id: &str) -> Result<bool, RepoError> {
        tracing::debug!(post_id, "Deleting post");
        let result = PostEntity::delete_many()
            .filter(post::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn set_hidden(&self, post_id: &str, hidden: bool) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Hidden, Expr::value(hidden))
            .col_expr(post::Column::UpdatedAt, Expr::value(fixed(Utc::now())))
            .filter(post::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_published(&self, include_hidden: bool) -> Result<Vec<Post>, RepoError> {
        let mut query =
            PostEntity::find().filter(post::Column::Status.eq(PostStatus::Published.as_str()));
        if !include_hidden {
            query = query.filter(post::Column::Hidden.eq(false));
        }

        let models = query
            .order_by_desc(post::Column::PublishedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Self::to_domain(models)
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .distinct()
            .filter(post::Column::Status.eq(PostStatus::Published.as_str()))
            .filter(post::Column::Hidden.eq(false))
            .order_by_asc(post::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(query_err)
    }

    async fn count(&self) -> Result<usize, RepoError> {
        let total = PostEntity::find().count(&self.db).await.map_err(query_err)?;
        Ok(usize::try_from(total).unwrap_or(usize::MAX))
    }
}
