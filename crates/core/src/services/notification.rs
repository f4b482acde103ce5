//! Notification service.
//!
//! Fan-out happens after the triggering write has committed and runs
//! detached from the client request. Failures here are logged, never
//! surfaced: a notification that goes missing must not undo or fail the
//! publication that triggered it.

use koinonia_common::{AppResult, IdGenerator};
use koinonia_db::{
    entities::notification::{self, NotificationCategory},
    repositories::{FollowingRepository, GroupRepository, NotificationRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Who a notification batch is addressed to.
///
/// Audiences are resolved at delivery time, so recipients who joined or
/// followed after the triggering event still receive it, and those who
/// left do not.
#[derive(Debug, Clone)]
pub enum NotifyScope {
    /// Every current member of a group.
    Group(String),
    /// Every current follower of a user.
    Followers(String),
    /// One specific user.
    User(String),
}

/// A notification batch to deliver.
#[derive(Debug, Clone)]
pub struct NotifyInput {
    /// User whose action triggered the batch. Never notified.
    pub actor_id: String,
    /// Audience to deliver to.
    pub scope: NotifyScope,
    /// Notification category.
    pub category: NotificationCategory,
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Deep link into the app, if any.
    pub link_url: Option<String>,
}

/// Notification as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub actor_id: Option<String>,
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
    pub link_url: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            actor_id: model.actor_id,
            category: model.category,
            title: model.title,
            body: model.body,
            link_url: model.link_url,
            is_read: model.is_read,
            created_at: model.created_at.into(),
        }
    }
}

/// Service for delivering and reading notifications.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    group_repo: GroupRepository,
    following_repo: FollowingRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        group_repo: GroupRepository,
        following_repo: FollowingRepository,
    ) -> Self {
        Self {
            notification_repo,
            group_repo,
            following_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Deliver a notification batch to its audience.
    ///
    /// Recipients are written one row at a time; a failed write is logged
    /// and skipped so the rest of the batch still lands. Rows already
    /// written stay written. Returns the number of rows written.
    pub async fn fan_out(&self, input: NotifyInput) -> AppResult<u64> {
        let recipient_ids = self
            .resolve_recipients(&input.actor_id, &input.scope)
            .await?;

        let mut written = 0u64;
        for recipient_id in recipient_ids {
            let model = notification::ActiveModel {
                id: Set(self.id_gen.generate()),
                recipient_id: Set(recipient_id.clone()),
                actor_id: Set(Some(input.actor_id.clone())),
                category: Set(input.category.clone()),
                title: Set(input.title.clone()),
                body: Set(input.body.clone()),
                link_url: Set(input.link_url.clone()),
                is_read: Set(false),
                created_at: Set(chrono::Utc::now().into()),
            };

            match self.notification_repo.create(model).await {
                Ok(_) => written += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        recipient_id = %recipient_id,
                        "Failed to write notification"
                    );
                }
            }
        }

        Ok(written)
    }

    /// Resolve the audience for a scope, excluding the actor.
    async fn resolve_recipients(
        &self,
        actor_id: &str,
        scope: &NotifyScope,
    ) -> AppResult<Vec<String>> {
        let ids: Vec<String> = match scope {
            NotifyScope::Group(group_id) => self
                .group_repo
                .find_all_members(group_id)
                .await?
                .into_iter()
                .map(|m| m.user_id)
                .collect(),
            NotifyScope::Followers(user_id) => self
                .following_repo
                .find_all_followers(user_id)
                .await?
                .into_iter()
                .map(|f| f.follower_id)
                .collect(),
            NotifyScope::User(user_id) => vec![user_id.clone()],
        };

        Ok(ids.into_iter().filter(|id| id != actor_id).collect())
    }

    /// List notifications for a user (newest first).
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<NotificationResponse>> {
        let notifications = self
            .notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await?;

        Ok(notifications.into_iter().map(Into::into).collect())
    }

    /// Count unread notifications for a user.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark a notification as read.
    ///
    /// Marking someone else's notification is a silent no-op.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        if let Some(n) = notification
            && n.recipient_id == user_id
        {
            self.notification_repo.mark_as_read(notification_id).await?;
        }
        Ok(())
    }

    /// Mark all of a user's notifications as read.
    ///
    /// Returns how many were flipped; calling again returns 0.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }
}
