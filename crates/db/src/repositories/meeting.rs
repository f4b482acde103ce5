//! Meeting repository.

use std::sync::Arc;

use chrono::Utc;
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{Meeting, meeting};

/// Meeting repository for database operations.
#[derive(Clone)]
pub struct MeetingRepository {
    db: Arc<DatabaseConnection>,
}

impl MeetingRepository {
    /// Create a new meeting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a meeting by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<meeting::Model>> {
        Meeting::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new meeting.
    pub async fn create(&self, model: meeting::ActiveModel) -> AppResult<meeting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find upcoming meetings for a group (soonest first).
    pub async fn find_upcoming_by_group(
        &self,
        group_id: &str,
        limit: u64,
    ) -> AppResult<Vec<meeting::Model>> {
        Meeting::find()
            .filter(meeting::Column::GroupId.eq(group_id))
            .filter(meeting::Column::ScheduledAt.gte(Utc::now()))
            .order_by(meeting::Column::ScheduledAt, Order::Asc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
