//! Following service.

use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::following,
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    pub async fn follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<following::Model> {
        // Can't follow yourself
        if follower_id == followee_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        // Check if already following
        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::BadRequest("Already following".to_string()));
        }

        // Both sides must exist
        let follower = self.user_repo.get_by_id(follower_id).await?;
        let followee = self.user_repo.get_by_id(followee_id).await?;

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id.clone()),
            followee_id: Set(followee.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let following = self.following_repo.create(model).await?;

        // Update counts
        self.user_repo
            .increment_following_count(&follower.id)
            .await?;
        self.user_repo
            .increment_followers_count(&followee.id)
            .await?;

        Ok(following)
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if !self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::BadRequest("Not following".to_string()));
        }

        self.following_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        // Update counts
        self.user_repo
            .decrement_following_count(follower_id)
            .await?;
        self.user_repo
            .decrement_followers_count(followee_id)
            .await?;

        Ok(())
    }

    /// Get followers of a user.
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_followers(user_id, limit, until_id)
            .await
    }

    /// Get users that a user is following.
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<following::Model>> {
        self.following_repo
            .find_following(user_id, limit, until_id)
            .await
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use koinonia_db::entities::user;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            token: Some("test_token".to_string()),
            display_name: Some("Test User".to_string()),
            bio: None,
            avatar_url: None,
            followers_count: 0,
            following_count: 0,
            reels_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_following(id: &str, follower_id: &str, followee_id: &str) -> following::Model {
        following::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(following_db: MockDatabase, user_db: MockDatabase) -> FollowingService {
        FollowingService::new(
            FollowingRepository::new(Arc::new(following_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_follow_self_rejected() {
        // Empty mocks: the self check fires before any storage access.
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.follow("user1", "user1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_twice_rejected() {
        let existing = create_test_following("follow1", "user1", "user2");

        let following_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let service = service_with(following_db, MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.follow("user1", "user2").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_creates_relationship_and_counts() {
        let follower = create_test_user("user1", "alice");
        let followee = create_test_user("user2", "bob");
        let following = create_test_following("follow1", "user1", "user2");

        let following_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<following::Model>::new()])
            .append_query_results([[following]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[follower]])
            .append_query_results([[followee]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);

        let service = service_with(following_db, user_db);

        let result = service.follow("user1", "user2").await.unwrap();
        assert_eq!(result.follower_id, "user1");
        assert_eq!(result.followee_id, "user2");
    }

    #[tokio::test]
    async fn test_follow_missing_followee_is_not_found() {
        let follower = create_test_user("user1", "alice");

        let following_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<following::Model>::new()]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[follower]])
            .append_query_results([Vec::<user::Model>::new()]);

        let service = service_with(following_db, user_db);

        let result = service.follow("user1", "missing").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following_rejected() {
        let following_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<following::Model>::new()]);

        let service = service_with(following_db, MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.unfollow("user1", "user2").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
