#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostStore;
    use chrono::Utc;
    use quill_core::domain::{Engagement, Post, PostStatus};
    use quill_core::error::RepoError;
    use quill_core::ports::{ContentUpdate, PostStore, UpdateOutcome};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::json;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// A single-column row, as returned by `select_only` queries.
    fn column(name: &'static str, value: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([(name, Value::from(value.to_owned()))])
    }

    fn model(post_id: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            sequential_id: 7,
            post_id: post_id.to_owned(),
            title: "Test Post".to_owned(),
            subtitle: None,
            excerpt: "Content".to_owned(),
            content: "<p>Content</p>".to_owned(),
            category: "Uncategorized".to_owned(),
            tags: json!(["one", "two"]),
            cover_image: String::new(),
            status: "published".to_owned(),
            hidden: false,
            date: Some(now.date_naive()),
            published_at: Some(now.into()),
            updated_at: now.into(),
            comments: 3,
            likes: 2,
            liked_by: json!(["user:1", "user:2"]),
            views: 11,
            viewed_by: json!({}),
            version: 4,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model("abc")]])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let post: Post = repo.find_by_id("abc").await.unwrap().unwrap();

        assert_eq!(post.post_id, "abc");
        assert_eq!(post.sequential_id, 7);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.tags, vec!["one", "two"]);
        assert_eq!(post.likes(), 2);
        assert_eq!(post.views(), 11);
        assert_eq!(post.version, 4);
    }

    #[tokio::test]
    async fn test_unknown_status_is_a_query_error() {
        let mut bad = model("abc");
        bad.status = "archived".to_owned();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![bad]])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        assert!(matches!(repo.find_by_id("abc").await, Err(RepoError::Query(_))));
    }

    #[tokio::test]
    async fn test_insert_batch_counts_conflicts_as_duplicates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let now = Utc::now();
        let outcome = repo
            .insert_batch(vec![
                Post::new("a", "A", "x", now),
                Post::new("b", "B", "y", now),
                Post::new("c", "C", "z", now),
            ])
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.duplicates, 2);
    }

    #[tokio::test]
    async fn test_update_engagement_reports_stale_version() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results(vec![vec![model("abc")]])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let outcome = repo
            .update_engagement("abc", 3, &Engagement::default())
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Stale);
    }

    #[tokio::test]
    async fn test_update_engagement_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let result = repo
            .update_engagement("missing", 0, &Engagement::default())
            .await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_scan_due_scheduled_returns_ids() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![column("post_id", "a"), column("post_id", "b")]])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let due = repo.scan_due_scheduled(Utc::now()).await.unwrap();
        assert_eq!(due, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_transition_status_reports_whether_a_row_moved() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![exec(1), exec(0)])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        assert!(repo
            .transition_status("a", PostStatus::Scheduled, PostStatus::Published, None)
            .await
            .unwrap());
        // Second call finds the post no longer scheduled.
        assert!(!repo
            .transition_status("a", PostStatus::Scheduled, PostStatus::Published, Some(Utc::now()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_content_and_delete_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![exec(1), exec(0), exec(1), exec(0)])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        let update = ContentUpdate {
            title: "Edited".to_owned(),
            subtitle: None,
            content: "<p>Edited</p>".to_owned(),
            excerpt: "Edited".to_owned(),
            category: "Uncategorized".to_owned(),
            tags: Vec::new(),
            cover_image: String::new(),
        };
        assert!(repo.update_content("abc", &update).await.unwrap());
        assert!(!repo.update_content("missing", &update).await.unwrap());
        assert!(repo.delete("abc").await.unwrap());
        assert!(!repo.delete("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_categories_maps_distinct_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![column("category", "Go"), column("category", "Rust")]])
            .into_connection();

        let repo = PostgresPostStore::new(db);
        assert_eq!(repo.categories().await.unwrap(), vec!["Go", "Rust"]);
    }
}
