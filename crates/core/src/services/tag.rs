//! Tag service.

use koinonia_common::AppResult;
use koinonia_db::{entities::tag, repositories::TagRepository};

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self { tag_repo }
    }

    /// List tags by usage (most used first).
    pub async fn trending(&self, limit: u64) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_popular(limit).await
    }

    /// Search tags by name prefix.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<tag::Model>> {
        if query.trim().is_empty() {
            return self.trending(limit).await;
        }

        self.tag_repo.search(query, limit).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
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
    async fn test_trending_orders_by_usage() {
        let t1 = create_test_tag("tag1", "faith", 42);
        let t2 = create_test_tag("tag2", "prayer", 17);

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[t1, t2]]);

        let service = TagService::new(TagRepository::new(Arc::new(db.into_connection())));

        let tags = service.trending(10).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "faith");
    }

    #[tokio::test]
    async fn test_blank_search_falls_back_to_trending() {
        let t1 = create_test_tag("tag1", "faith", 42);

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[t1]]);

        let service = TagService::new(TagRepository::new(Arc::new(db.into_connection())));

        let tags = service.search("  ", 10).await.unwrap();
        assert_eq!(tags.len(), 1);
    }
}
