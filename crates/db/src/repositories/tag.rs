//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, OnConflict},
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record one use of a tag.
    ///
    /// Single conditional upsert: inserts the row on first use, otherwise
    /// bumps `usage_count` in place. Concurrent publishes never lose an
    /// increment because there is no read-modify-write window.
    pub async fn upsert_usage(&self, model: tag::ActiveModel) -> AppResult<()> {
        Tag::insert(model)
            .on_conflict(
                OnConflict::column(tag::Column::Name)
                    .value(
                        tag::Column::UsageCount,
                        Expr::col(tag::Column::UsageCount).add(1),
                    )
                    .value(tag::Column::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the most used tags.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_desc(tag::Column::UsageCount)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search tags by name prefix.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.like(format!("{}%", query.to_lowercase())))
            .order_by_desc(tag::Column::UsageCount)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_tag(id: &str, name: &str, usage_count: i64) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            usage_count,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_usage_is_a_single_statement() {
        // One exec result and no query results: a read before the write
        // would fail the test.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = TagRepository::new(db);

        let active = tag::ActiveModel {
            id: Set("tag1".to_string()),
            name: Set("faith".to_string()),
            usage_count: Set(1),
            ..Default::default()
        };

        repo.upsert_usage(active).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let tag = create_test_tag("tag1", "faith", 12);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[tag.clone()]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.find_by_name("Faith").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().usage_count, 12);
    }

    #[tokio::test]
    async fn test_find_popular() {
        let t1 = create_test_tag("tag1", "faith", 40);
        let t2 = create_test_tag("tag2", "prayer", 25);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[t1, t2]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.find_popular(10).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "faith");
    }
}
