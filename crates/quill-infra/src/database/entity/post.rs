//! Post entity for SeaORM.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde_json::json;

use quill_core::domain::{Engagement, Post};
use quill_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub sequential_id: i64,
    #[sea_orm(unique)]
    pub post_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub cover_image: String,
    pub status: String,
    pub hidden: bool,
    pub date: Option<Date>,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
    pub comments: i32,
    pub likes: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub liked_by: Json,
    pub views: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub viewed_by: Json,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode<T: serde::de::DeserializeOwned>(column: &str, value: Json) -> Result<T, RepoError> {
    serde_json::from_value(value)
        .map_err(|e| RepoError::Query(format!("invalid {column} column: {e}")))
}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let liked_by: Vec<String> = decode("liked_by", model.liked_by)?;
        let viewed_by: BTreeMap<String, DateTime<Utc>> = decode("viewed_by", model.viewed_by)?;

        Ok(Self {
            post_id: model.post_id,
            sequential_id: model.sequential_id,
            title: model.title,
            subtitle: model.subtitle,
            excerpt: model.excerpt,
            content: model.content,
            category: model.category,
            tags: decode("tags", model.tags)?,
            cover_image: model.cover_image,
            status: model.status.parse().map_err(RepoError::Query)?,
            hidden: model.hidden,
            date: model.date,
            published_at: model.published_at.map(Into::into),
            updated_at: model.updated_at.into(),
            comments: u32::try_from(model.comments).unwrap_or_default(),
            engagement: Engagement::restore(
                liked_by,
                u64::try_from(model.views).unwrap_or_default(),
                viewed_by,
            ),
            version: model.version,
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
///
/// A zero `sequential_id` is left unset so the database assigns it.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        let engagement = &post.engagement;
        Self {
            sequential_id: if post.sequential_id == 0 {
                NotSet
            } else {
                Set(post.sequential_id)
            },
            post_id: Set(post.post_id.clone()),
            title: Set(post.title.clone()),
            subtitle: Set(post.subtitle.clone()),
            excerpt: Set(post.excerpt.clone()),
            content: Set(post.content.clone()),
            category: Set(post.category.clone()),
            tags: Set(json!(post.tags)),
            cover_image: Set(post.cover_image.clone()),
            status: Set(post.status.as_str().to_string()),
            hidden: Set(post.hidden),
            date: Set(post.date),
            published_at: Set(post.published_at.map(Into::into)),
            updated_at: Set(post.updated_at.into()),
            comments: Set(i32::try_from(post.comments).unwrap_or(i32::MAX)),
            likes: Set(engagement.likes() as i64),
            liked_by: Set(json!(engagement.liked_by())),
            views: Set(engagement.views() as i64),
            viewed_by: Set(json!(engagement.viewed_by())),
            version: Set(post.version),
        }
    }
}
