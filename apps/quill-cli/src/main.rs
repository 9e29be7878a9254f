//! Operator commands: feed sync, cover repair, authoring and publication.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use quill_core::domain::PostStatus;
use quill_core::ports::{FeedSource, PostStore};
use quill_core::services::{
    FeedIngestion, IngestionConfig, NewPost, PostAuthoring, PostEdit, PublicationScheduler,
};
use quill_infra::{
    BloggerConfig, BloggerFeedSource, DatabaseConfig, PostgresPostStore, StaticFeedSource,
};
use quill_shared::dto::{CoverRepairResponse, PublishResponse, SyncResponse};

#[derive(Debug, Parser)]
#[command(name = "quill")]
#[command(about = "Quill post store operations")]
struct Cli {
    /// Posts database.
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Print the result as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pull every page of the upstream feed and store new posts.
    Sync,
    /// Fill empty cover images from the first image in each post body.
    FixCovers,
    /// Publish scheduled posts whose publish time has passed.
    PublishDue,
    /// Create a post. Published now unless a status or future time says otherwise.
    Create {
        #[command(flatten)]
        content: ContentArgs,
        /// draft, published or scheduled.
        #[arg(long)]
        status: Option<PostStatus>,
        /// RFC 3339 instant. A future instant schedules the post.
        #[arg(long)]
        publish_at: Option<DateTime<Utc>>,
    },
    /// Replace a post's content. Status and engagement are kept.
    Edit {
        post_id: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Delete a post.
    Delete { post_id: String },
    /// Publish one draft or scheduled post now.
    Publish { post_id: String },
    /// Schedule a post. A time that is not in the future publishes it now.
    Schedule {
        post_id: String,
        /// RFC 3339 instant, e.g. 2026-01-31T09:00:00Z.
        at: DateTime<Utc>,
    },
    /// Hide a post from public listings.
    Hide { post_id: String },
    /// Make a hidden post public again.
    Unhide { post_id: String },
}

/// Post fields shared by `create` and `edit`.
#[derive(Debug, Args)]
struct ContentArgs {
    #[arg(long)]
    title: String,
    /// File holding the post body markup.
    #[arg(long)]
    content_file: PathBuf,
    #[arg(long)]
    subtitle: Option<String>,
    /// Defaults to Uncategorized.
    #[arg(long)]
    category: Option<String>,
    /// Repeat for several tags.
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    cover_image: Option<String>,
}

impl ContentArgs {
    fn into_edit(self) -> Result<PostEdit> {
        let content = std::fs::read_to_string(&self.content_file)
            .with_context(|| format!("failed to read {}", self.content_file.display()))?;
        Ok(PostEdit {
            title: self.title,
            subtitle: self.subtitle,
            content,
            category: self.category,
            tags: self.tags,
            cover_image: self.cover_image,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,quill_core=debug,quill_infra=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.database_url.clone()).await?;
    let now = Utc::now();

    match cli.command {
        Commands::Sync => {
            let config = BloggerConfig::from_env().context("BLOGGER_BLOG_ID must be set to sync")?;
            let source: Arc<dyn FeedSource> = Arc::new(BloggerFeedSource::new(config)?);
            let report = FeedIngestion::new(store, source, IngestionConfig::default())
                .sync()
                .await?;
            let body = SyncResponse {
                fetched: report.fetched,
                inserted: report.inserted,
                skipped: report.skipped,
            };
            emit(cli.json, &body, || {
                format!(
                    "sync complete: fetched={} inserted={} skipped={}",
                    body.fetched, body.inserted, body.skipped
                )
            })?;
        }
        Commands::FixCovers => {
            // Cover repair reads only the store.
            let source: Arc<dyn FeedSource> = Arc::new(StaticFeedSource::empty());
            let report = FeedIngestion::new(store, source, IngestionConfig::default())
                .fix_missing_cover_images()
                .await?;
            let body = CoverRepairResponse {
                updated: report.updated,
                total_checked: report.total_checked,
            };
            emit(cli.json, &body, || {
                format!(
                    "cover repair complete: updated={} checked={}",
                    body.updated, body.total_checked
                )
            })?;
        }
        Commands::PublishDue => {
            let report = PublicationScheduler::new(store).publish_due(now).await?;
            let body = PublishResponse {
                published_count: report.published_count,
            };
            emit(cli.json, &body, || {
                format!("published {} scheduled post(s)", body.published_count)
            })?;
        }
        Commands::Create {
            content,
            status,
            publish_at,
        } => {
            let edit = content.into_edit()?;
            let input = NewPost {
                title: edit.title,
                subtitle: edit.subtitle,
                content: edit.content,
                category: edit.category,
                tags: edit.tags,
                cover_image: edit.cover_image,
                status,
                publish_at,
            };
            let post = PostAuthoring::new(store).create(input, now).await?;
            println!("{}: created as {}", post.post_id, post.status);
        }
        Commands::Edit { post_id, content } => {
            let edit = content.into_edit()?;
            PostAuthoring::new(store).update(&post_id, edit).await?;
            println!("{post_id}: updated");
        }
        Commands::Delete { post_id } => {
            PostAuthoring::new(store).delete(&post_id).await?;
            println!("{post_id}: deleted");
        }
        Commands::Publish { post_id } => {
            PostAuthoring::new(store).publish(&post_id, now).await?;
            println!("{post_id}: published");
        }
        Commands::Schedule { post_id, at } => {
            let status = PostAuthoring::new(store).schedule(&post_id, at, now).await?;
            println!("{post_id}: {status} at {}", at.to_rfc3339());
        }
        Commands::Hide { post_id } => {
            PostAuthoring::new(store).set_hidden(&post_id, true).await?;
            println!("{post_id}: hidden");
        }
        Commands::Unhide { post_id } => {
            PostAuthoring::new(store).set_hidden(&post_id, false).await?;
            println!("{post_id}: visible");
        }
    }

    Ok(())
}

async fn open_store(database_url: Option<String>) -> Result<Arc<dyn PostStore>> {
    let url = database_url.context("DATABASE_URL must be set")?;
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
    };
    let conn = quill_infra::connect(&config)
        .await
        .context("failed to connect to the posts database")?;
    Ok(Arc::new(PostgresPostStore::new(conn)))
}

fn emit<T: Serialize>(json: bool, body: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(body)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
