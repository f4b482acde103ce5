//! Meeting service.

use chrono::{DateTime, Utc};
use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::meeting,
    repositories::{GroupRepository, MeetingRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for scheduling a group meeting.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingInput {
    pub group_id: String,

    #[validate(length(min = 1, max = 256))]
    pub title: String,

    pub scheduled_at: DateTime<Utc>,

    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
}

/// Service for group meetings.
#[derive(Clone)]
pub struct MeetingService {
    meeting_repo: MeetingRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl MeetingService {
    /// Create a new meeting service.
    #[must_use]
    pub const fn new(meeting_repo: MeetingRepository, group_repo: GroupRepository) -> Self {
        Self {
            meeting_repo,
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Schedule a meeting for a group. Only members may do this.
    ///
    /// The conference room identifier is provisioned here, never supplied
    /// by the client.
    pub async fn schedule(
        &self,
        organizer_id: &str,
        input: ScheduleMeetingInput,
    ) -> AppResult<meeting::Model> {
        input.validate()?;

        if input.scheduled_at <= Utc::now() {
            return Err(AppError::Validation(
                "Meeting must be scheduled in the future".to_string(),
            ));
        }

        self.group_repo.get_by_id(&input.group_id).await?;

        if !self
            .group_repo
            .is_member(organizer_id, &input.group_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "Only members can schedule meetings".to_string(),
            ));
        }

        let model = meeting::ActiveModel {
            id: Set(self.id_gen.generate()),
            group_id: Set(input.group_id),
            organizer_id: Set(organizer_id.to_string()),
            title: Set(input.title),
            room_id: Set(format!("room_{}", self.id_gen.generate_token())),
            scheduled_at: Set(input.scheduled_at.into()),
            duration_minutes: Set(input.duration_minutes),
            created_at: Set(Utc::now().into()),
        };

        self.meeting_repo.create(model).await
    }

    /// List upcoming meetings for a group. Only members may see them.
    pub async fn upcoming(
        &self,
        user_id: &str,
        group_id: &str,
        limit: u64,
    ) -> AppResult<Vec<meeting::Model>> {
        self.group_repo.get_by_id(group_id).await?;

        if !self.group_repo.is_member(user_id, group_id).await? {
            return Err(AppError::Forbidden(
                "Only members can view meetings".to_string(),
            ));
        }

        self.meeting_repo.find_upcoming_by_group(group_id, limit).await
    }
}
