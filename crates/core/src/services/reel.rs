//! Reel service.
//!
//! Publication order is fixed: screen first, write the reel, then update
//! the tag registry. A flagged verdict stops everything before the first
//! write, and tag bookkeeping failures never undo a stored reel.

use crate::services::moderation::{ModerationGate, PublishOutcome};
use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{reel, tag},
    repositories::{ReelRepository, TagRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Input for publishing a reel.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReelInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    #[validate(url, length(max = 1024))]
    pub video_url: String,

    #[validate(length(max = 16))]
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Reel service for business logic.
#[derive(Clone)]
pub struct ReelService {
    reel_repo: ReelRepository,
    user_repo: UserRepository,
    tag_repo: TagRepository,
    classifier: ModerationGate,
    id_gen: IdGenerator,
}

impl ReelService {
    /// Create a new reel service.
    #[must_use]
    pub const fn new(
        reel_repo: ReelRepository,
        user_repo: UserRepository,
        tag_repo: TagRepository,
        classifier: ModerationGate,
    ) -> Self {
        Self {
            reel_repo,
            user_repo,
            tag_repo,
            classifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new reel.
    ///
    /// A flagged verdict returns `Rejected` before anything is stored.
    pub async fn publish(
        &self,
        author_id: &str,
        input: CreateReelInput,
    ) -> AppResult<PublishOutcome<reel::Model>> {
        input.validate()?;

        let verdict = self
            .classifier
            .classify(&screening_text(&input.title, input.description.as_deref()))
            .await?;

        if verdict.flagged {
            tracing::info!(author_id = %author_id, "Reel rejected by moderation");
            return Ok(PublishOutcome::Rejected {
                reason: verdict.reason,
            });
        }

        let tags = normalize_tags(&input.tags);

        let model = reel::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            title: Set(input.title),
            description: Set(input.description),
            video_url: Set(input.video_url),
            tags: Set(json!(tags)),
            likes_count: Set(0),
            views_count: Set(0),
            comments_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let reel = self.reel_repo.create(model).await?;

        self.user_repo.increment_reels_count(author_id).await?;

        // Tag bookkeeping must not undo a stored reel.
        for tag in &tags {
            let tag_model = tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(tag.clone()),
                usage_count: Set(1),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            };

            if let Err(e) = self.tag_repo.upsert_usage(tag_model).await {
                tracing::warn!(error = %e, tag = %tag, reel_id = %reel.id, "Failed to record tag usage");
            }
        }

        Ok(PublishOutcome::Published(reel))
    }

    /// Get a reel by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<reel::Model> {
        self.reel_repo.get_by_id(id).await
    }

    /// Get the global timeline (newest first).
    pub async fn timeline(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<reel::Model>> {
        self.reel_repo.find_recent(limit, until_id).await
    }

    /// Get reels by a specific author (newest first).
    pub async fn by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reel::Model>> {
        self.reel_repo.find_by_author(author_id, limit, until_id).await
    }

    /// Record a like on a reel.
    pub async fn like(&self, reel_id: &str) -> AppResult<()> {
        self.reel_repo.get_by_id(reel_id).await?;
        self.reel_repo.increment_likes_count(reel_id).await
    }

    /// Record a view on a reel.
    pub async fn view(&self, reel_id: &str) -> AppResult<()> {
        self.reel_repo.get_by_id(reel_id).await?;
        self.reel_repo.increment_views_count(reel_id).await
    }

    /// Delete a reel. Only the author may do this.
    pub async fn delete(&self, user_id: &str, reel_id: &str) -> AppResult<()> {
        let reel = self.reel_repo.get_by_id(reel_id).await?;
        if reel.author_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete a reel".to_string(),
            ));
        }

        self.reel_repo.delete(reel_id).await?;
        self.user_repo.decrement_reels_count(&reel.author_id).await?;

        Ok(())
    }
}

/// Text submitted to the moderation gate for a reel.
fn screening_text(title: &str, description: Option<&str>) -> String {
    match description {
        Some(d) if !d.trim().is_empty() => format!("{title}\n{d}"),
        _ => title.to_string(),
    }
}

/// Normalize tags: trim, lowercase, drop blanks, dedupe preserving order.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let normalized = tag.trim().to_lowercase();
        if !normalized.is_empty() && !seen.contains(&normalized) {
            seen.push(normalized);
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::moderation::{ClassifierVerdict, ContentClassifier, NoOpClassifier};
    use async_trait::async_trait;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    /// Classifier that always returns the same verdict.
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

    fn create_input(tags: Vec<&str>) -> CreateReelInput {
        CreateReelInput {
            title: "Morning devotion".to_string(),
            description: Some("Starting the day in prayer".to_string()),
            video_url: "https://cdn.example.com/v/1.mp4".to_string(),
            tags: tags.into_iter().map(String::from).collect(),
        }
    }

    fn service_with(
        reel_db: MockDatabase,
        user_db: MockDatabase,
        tag_db: MockDatabase,
        classifier: ModerationGate,
    ) -> ReelService {
        ReelService::new(
            ReelRepository::new(Arc::new(reel_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
            TagRepository::new(Arc::new(tag_db.into_connection())),
            classifier,
        )
    }

    #[test]
    fn test_normalize_tags_case_and_whitespace() {
        let tags = normalize_tags(&[
            "Faith ".to_string(),
            "faith".to_string(),
            " FAITH".to_string(),
        ]);

        assert_eq!(tags, vec!["faith"]);
    }

    #[test]
    fn test_normalize_tags_drops_blanks_keeps_order() {
        let tags = normalize_tags(&[
            "Prayer".to_string(),
            "  ".to_string(),
            "worship".to_string(),
            "prayer".to_string(),
        ]);

        assert_eq!(tags, vec!["prayer", "worship"]);
    }

    #[test]
    fn test_screening_text_skips_blank_description() {
        assert_eq!(screening_text("Title", None), "Title");
        assert_eq!(screening_text("Title", Some("  ")), "Title");
        assert_eq!(screening_text("Title", Some("Body")), "Title\nBody");
    }

    #[tokio::test]
    async fn test_publish_flagged_writes_nothing() {
        // Every mock is empty: any storage call would error, so a clean
        // Rejected result proves the flagged path never touches the
        // database.
        let classifier = Arc::new(StubClassifier {
            verdict: ClassifierVerdict {
                flagged: true,
                reason: Some("spam".to_string()),
            },
        });

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            classifier,
        );

        let outcome = service
            .publish("user1", create_input(vec!["faith"]))
            .await
            .unwrap();

        match outcome {
            PublishOutcome::Rejected { reason } => {
                assert_eq!(reason.as_deref(), Some("spam"));
            }
            PublishOutcome::Published(_) => panic!("Expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_publish_stores_reel_and_counts_tags() {
        let reel = create_test_reel("reel1", "user1");

        let reel_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reel.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);
        // Two distinct tags after normalization, so two upserts.
        let tag_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);

        let service = service_with(reel_db, user_db, tag_db, Arc::new(NoOpClassifier));

        let outcome = service
            .publish("user1", create_input(vec!["Faith ", "faith", "Prayer"]))
            .await
            .unwrap();

        match outcome {
            PublishOutcome::Published(stored) => assert_eq!(stored.id, "reel1"),
            PublishOutcome::Rejected { .. } => panic!("Expected publication"),
        }
    }

    #[tokio::test]
    async fn test_publish_survives_tag_upsert_failure() {
        let reel = create_test_reel("reel1", "user1");

        let reel_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reel.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]);
        // Empty tag mock: the upsert fails, the publish must not.
        let tag_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_with(reel_db, user_db, tag_db, Arc::new(NoOpClassifier));

        let outcome = service
            .publish("user1", create_input(vec!["faith"]))
            .await
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::Published(_)));
    }

    #[tokio::test]
    async fn test_publish_rejects_invalid_video_url() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(NoOpClassifier),
        );

        let input = CreateReelInput {
            title: "Morning devotion".to_string(),
            description: None,
            video_url: "not a url".to_string(),
            tags: vec![],
        };

        let result = service.publish("user1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let reel = create_test_reel("reel1", "user1");

        // One query result only: the fetch. A delete would consume an
        // exec result and error.
        let reel_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[reel.clone()]]);

        let service = service_with(
            reel_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(NoOpClassifier),
        );

        let result = service.delete("user2", "reel1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_like_missing_reel_is_not_found() {
        let reel_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<reel::Model>::new()]);

        let service = service_with(
            reel_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(NoOpClassifier),
        );

        let result = service.like("missing").await;
        assert!(matches!(result, Err(AppError::ReelNotFound(_))));
    }
}
