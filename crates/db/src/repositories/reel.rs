//! Reel repository.

use std::sync::Arc;

use crate::entities::{Reel, reel};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Reel repository for database operations.
#[derive(Clone)]
pub struct ReelRepository {
    db: Arc<DatabaseConnection>,
}

impl ReelRepository {
    /// Create a new reel repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reel by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<reel::Model>> {
        Reel::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a reel by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<reel::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ReelNotFound(id.to_string()))
    }

    /// Create a new reel.
    pub async fn create(&self, model: reel::ActiveModel) -> AppResult<reel::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a reel permanently.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Reel::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find recent reels (global timeline, newest first, paginated).
    pub async fn find_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reel::Model>> {
        let mut query = Reel::find().order_by_desc(reel::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(reel::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find reels by author (newest first, paginated).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reel::Model>> {
        let mut query = Reel::find()
            .filter(reel::Column::AuthorId.eq(author_id))
            .order_by_desc(reel::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(reel::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment likes count atomically (single UPDATE query, no fetch).
    pub async fn increment_likes_count(&self, id: &str) -> AppResult<()> {
        Reel::update_many()
            .col_expr(
                reel::Column::LikesCount,
                Expr::col(reel::Column::LikesCount).add(1),
            )
            .filter(reel::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment views count atomically (single UPDATE query, no fetch).
    pub async fn increment_views_count(&self, id: &str) -> AppResult<()> {
        Reel::update_many()
            .col_expr(
                reel::Column::ViewsCount,
                Expr::col(reel::Column::ViewsCount).add(1),
            )
            .filter(reel::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment comments count atomically (single UPDATE query, no fetch).
    pub async fn increment_comments_count(&self, id: &str) -> AppResult<()> {
        Reel::update_many()
            .col_expr(
                reel::Column::CommentsCount,
                Expr::col(reel::Column::CommentsCount).add(1),
            )
            .filter(reel::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement comments count atomically (single UPDATE query, no fetch).
    pub async fn decrement_comments_count(&self, id: &str) -> AppResult<()> {
        Reel::update_many()
            .col_expr(
                reel::Column::CommentsCount,
                Expr::cust("GREATEST(comments_count - 1, 0)"),
            )
            .filter(reel::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_reel(id: &str, author_id: &str) -> reel::Model {
        reel::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Morning devotion".to_string(),
            description: None,
            video_url: "https://cdn.example.com/v/1.mp4".to_string(),
            tags: serde_json::json!([]),
            likes_count: 0,
            views_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let reel = create_test_reel("reel1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reel.clone()]])
                .into_connection(),
        );

        let repo = ReelRepository::new(db);
        let result = repo.find_by_id("reel1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().author_id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_is_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<reel::Model>::new()])
                .into_connection(),
        );

        let repo = ReelRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ReelNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_reel() {
        let reel = create_test_reel("reel1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reel.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReelRepository::new(db);

        let active = reel::ActiveModel {
            id: Set("reel1".to_string()),
            author_id: Set("user1".to_string()),
            title: Set("Morning devotion".to_string()),
            video_url: Set("https://cdn.example.com/v/1.mp4".to_string()),
            tags: Set(serde_json::json!([])),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.title, "Morning devotion");
    }

    #[tokio::test]
    async fn test_find_by_author() {
        let reel1 = create_test_reel("reel1", "user1");
        let reel2 = create_test_reel("reel2", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reel2, reel1]])
                .into_connection(),
        );

        let repo = ReelRepository::new(db);
        let result = repo.find_by_author("user1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_increment_likes_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReelRepository::new(db);
        repo.increment_likes_count("reel1").await.unwrap();
    }
}
