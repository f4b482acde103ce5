//! Comment service.

use crate::services::moderation::{ModerationGate, PublishOutcome};
use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::comment,
    repositories::{CommentRepository, ReelRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for commenting on a reel.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentInput {
    pub reel_id: String,

    #[validate(length(min = 1, max = 2048))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    reel_repo: ReelRepository,
    classifier: ModerationGate,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        reel_repo: ReelRepository,
        classifier: ModerationGate,
    ) -> Self {
        Self {
            comment_repo,
            reel_repo,
            classifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a reel.
    ///
    /// The content is screened before the reel is even looked up, so a
    /// flagged comment leaves no trace in storage.
    pub async fn add(
        &self,
        author_id: &str,
        input: AddCommentInput,
    ) -> AppResult<PublishOutcome<comment::Model>> {
        input.validate()?;

        let verdict = self.classifier.classify(&input.content).await?;

        if verdict.flagged {
            tracing::info!(author_id = %author_id, reel_id = %input.reel_id, "Comment rejected by moderation");
            return Ok(PublishOutcome::Rejected {
                reason: verdict.reason,
            });
        }

        let reel = self.reel_repo.get_by_id(&input.reel_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            reel_id: Set(reel.id.clone()),
            author_id: Set(author_id.to_string()),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;

        self.reel_repo.increment_comments_count(&reel.id).await?;

        Ok(PublishOutcome::Published(comment))
    }

    /// List comments on a reel (newest first).
    pub async fn list(
        &self,
        reel_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_reel(reel_id, limit, until_id).await
    }

    /// Count comments on a reel.
    pub async fn count(&self, reel_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_reel(reel_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::moderation::{ClassifierVerdict, ContentClassifier, NoOpClassifier};
    use async_trait::async_trait;
    use chrono::Utc;
    use koinonia_common::AppError;
    use koinonia_db::entities::reel;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;

    struct StubClassifier {
        verdict: ClassifierVerdict,
    }

    #[async_trait]
    impl ContentClassifier for StubClassifier {
        async fn classify(&self, _content: &str) -> AppResult<ClassifierVerdict> {
            Ok(self.verdict.clone())
        }
    }

    fn create_test_reel(id: &str, author_id: &str) -> reel::Model {
        reel::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Morning devotion".to_string(),
            description: None,
            video_url: "https://cdn.example.com/v/1.mp4".to_string(),
            tags: json!(["faith"]),
            likes_count: 0,
            views_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, reel_id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            reel_id: reel_id.to_string(),
            author_id: author_id.to_string(),
            content: "Amen to this".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        comment_db: MockDatabase,
        reel_db: MockDatabase,
        classifier: ModerationGate,
    ) -> CommentService {
        CommentService::new(
            CommentRepository::new(Arc::new(comment_db.into_connection())),
            ReelRepository::new(Arc::new(reel_db.into_connection())),
            classifier,
        )
    }

    fn create_input(reel_id: &str) -> AddCommentInput {
        AddCommentInput {
            reel_id: reel_id.to_string(),
            content: "Amen to this".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_flagged_writes_nothing() {
        // Both mocks are empty: the flagged path must not even look the
        // reel up, let alone insert anything.
        let classifier = Arc::new(StubClassifier {
            verdict: ClassifierVerdict {
                flagged: true,
                reason: Some("harassment".to_string()),
            },
        });

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            classifier,
        );

        let outcome = service.add("user1", create_input("reel1")).await.unwrap();

        match outcome {
            PublishOutcome::Rejected { reason } => {
                assert_eq!(reason.as_deref(), Some("harassment"));
            }
            PublishOutcome::Published(_) => panic!("Expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_add_missing_reel_is_not_found() {
        let reel_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reel::Model>::new()]);

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            reel_db,
            Arc::new(NoOpClassifier),
        );

        let result = service.add("user1", create_input("missing")).await;
        assert!(matches!(result, Err(AppError::ReelNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_stores_comment_and_bumps_count() {
        let reel = create_test_reel("reel1", "author1");
        let comment = create_test_comment("comment1", "reel1", "user1");

        let reel_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reel]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment]]);

        let service = service_with(comment_db, reel_db, Arc::new(NoOpClassifier));

        let outcome = service.add("user1", create_input("reel1")).await.unwrap();

        match outcome {
            PublishOutcome::Published(stored) => {
                assert_eq!(stored.id, "comment1");
                assert_eq!(stored.reel_id, "reel1");
            }
            PublishOutcome::Rejected { .. } => panic!("Expected publication"),
        }
    }

    #[tokio::test]
    async fn test_add_rejects_empty_content() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(NoOpClassifier),
        );

        let input = AddCommentInput {
            reel_id: "reel1".to_string(),
            content: String::new(),
        };

        let result = service.add("user1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
