//! Group service.

use chrono::Utc;
use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::entities::group_member::GroupRole;
use koinonia_db::entities::{group, group_member};
use koinonia_db::repositories::GroupRepository;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Group response with member info.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub members_count: i64,
    pub created_at: chrono::DateTime<Utc>,
    pub is_member: bool,
    pub my_role: Option<GroupRole>,
}

impl GroupResponse {
    #[must_use]
    pub fn from_model(model: group::Model, is_member: bool, my_role: Option<GroupRole>) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            description: model.description,
            members_count: model.members_count,
            created_at: model.created_at.into(),
            is_member,
            my_role,
        }
    }
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// Get a group by ID with member info.
    pub async fn get_with_member_info(&self, id: &str, user_id: &str) -> AppResult<GroupResponse> {
        let group = self.group_repo.get_by_id(id).await?;
        let member = self.group_repo.get_member(user_id, id).await?;
        let is_member = member.is_some();
        let my_role = member.map(|m| m.role);

        Ok(GroupResponse::from_model(group, is_member, my_role))
    }

    /// List groups by member count.
    pub async fn list_popular(&self, limit: u64, offset: u64) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_popular(limit, offset).await
    }

    /// List groups user is a member of.
    pub async fn list_joined(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group::Model>> {
        self.group_repo
            .find_joined_by_user(user_id, limit, offset)
            .await
    }

    /// Search groups by name.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group::Model>> {
        if query.trim().is_empty() {
            return self.list_popular(limit, offset).await;
        }

        self.group_repo.search(query, limit, offset).await
    }

    /// Create a new group.
    pub async fn create(&self, user_id: &str, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let group_id = self.id_gen.generate();
        let now = Utc::now();

        let model = group::ActiveModel {
            id: Set(group_id.clone()),
            owner_id: Set(user_id.to_string()),
            name: Set(input.name),
            description: Set(input.description),
            members_count: Set(1), // Owner is the first member
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let group = self.group_repo.create(model).await?;

        let member_model = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            group_id: Set(group_id),
            role: Set(GroupRole::Leader),
            joined_at: Set(now.into()),
        };

        // Don't increment member count since it's already 1
        member_model
            .insert(self.group_repo.db())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(group)
    }

    /// Join a group. Returns the joined group.
    pub async fn join(&self, user_id: &str, group_id: &str) -> AppResult<group::Model> {
        let group = self.group_repo.get_by_id(group_id).await?;

        if self.group_repo.is_member(user_id, group_id).await? {
            return Err(AppError::Validation("Already a member".to_string()));
        }

        let model = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            group_id: Set(group_id.to_string()),
            role: Set(GroupRole::Member),
            joined_at: Set(Utc::now().into()),
        };

        self.group_repo.add_member(model).await?;

        Ok(group)
    }

    /// Leave a group.
    pub async fn leave(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_id(group_id).await?;

        // Owner stays until the group is deleted
        if group.owner_id == user_id {
            return Err(AppError::Validation(
                "The owner cannot leave the group".to_string(),
            ));
        }

        self.group_repo
            .get_member(user_id, group_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not a member".to_string()))?;

        self.group_repo.remove_member(user_id, group_id).await
    }

    /// List members of a group.
    pub async fn list_members(
        &self,
        group_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_member::Model>> {
        self.group_repo.list_members(group_id, limit, offset).await
    }

    /// Check if a user is a member of a group.
    pub async fn is_member(&self, user_id: &str, group_id: &str) -> AppResult<bool> {
        self.group_repo.is_member(user_id, group_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_group(id: &str, owner_id: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: "Young Adults".to_string(),
            description: Some("Weekly fellowship".to_string()),
            members_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(id: &str, user_id: &str, group_id: &str, role: GroupRole) -> group_member::Model {
        group_member::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    fn service_with(db: MockDatabase) -> GroupService {
        GroupService::new(GroupRepository::new(Arc::new(db.into_connection())))
    }

    fn member_count(n: i64) -> Vec<std::collections::BTreeMap<&'static str, sea_orm::Value>> {
        vec![btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n)),
        }]
    }

    #[tokio::test]
    async fn test_create_inserts_group_and_founding_member() {
        let group = create_test_group("group1", "user1");
        let member = create_test_member("member1", "user1", "group1", GroupRole::Leader);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .append_query_results([[member]]);

        let service = service_with(db);

        let input = CreateGroupInput {
            name: "Young Adults".to_string(),
            description: Some("Weekly fellowship".to_string()),
        };

        let created = service.create("user1", input).await.unwrap();
        assert_eq!(created.id, "group1");
        assert_eq!(created.members_count, 1);
    }

    #[tokio::test]
    async fn test_join_rejects_existing_member() {
        let group = create_test_group("group1", "owner1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .append_query_results([member_count(1)]);

        let service = service_with(db);

        let result = service.join("user2", "group1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_join_adds_member() {
        let group = create_test_group("group1", "owner1");
        let member = create_test_member("member2", "user2", "group1", GroupRole::Member);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .append_query_results([member_count(0)])
            .append_query_results([[member]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let service = service_with(db);

        let joined = service.join("user2", "group1").await.unwrap();
        assert_eq!(joined.id, "group1");
    }

    #[tokio::test]
    async fn test_join_missing_group_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()]);

        let service = service_with(db);

        let result = service.join("user2", "missing").await;
        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_leave_rejects_owner() {
        let group = create_test_group("group1", "user1");

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[group]]);

        let service = service_with(db);

        let result = service.leave("user1", "group1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_leave_requires_membership() {
        let group = create_test_group("group1", "owner1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[group]])
            .append_query_results([Vec::<group_member::Model>::new()]);

        let service = service_with(db);

        let result = service.leave("user2", "group1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
