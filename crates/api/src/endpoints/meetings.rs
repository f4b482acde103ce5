//! Meeting endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::{NotifyInput, NotifyScope, ScheduleMeetingInput};
use koinonia_db::entities::{meeting, notification::NotificationCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Meeting response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: String,
    pub group_id: String,
    pub organizer_id: String,
    pub title: String,
    pub room_id: String,
    pub scheduled_at: String,
    pub duration_minutes: Option<i32>,
    pub created_at: String,
}

impl From<meeting::Model> for MeetingResponse {
    fn from(meeting: meeting::Model) -> Self {
        Self {
            id: meeting.id,
            group_id: meeting.group_id,
            organizer_id: meeting.organizer_id,
            title: meeting.title,
            room_id: meeting.room_id,
            scheduled_at: meeting.scheduled_at.to_rfc3339(),
            duration_minutes: meeting.duration_minutes,
            created_at: meeting.created_at.to_rfc3339(),
        }
    }
}

/// Schedule meeting request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    #[serde(flatten)]
    pub input: ScheduleMeetingInput,
}

/// Schedule meeting response with the provisioned conference room.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingResponse {
    pub meeting_id: String,
    pub room_id: String,
}

/// Schedule a meeting in a group.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ScheduleMeetingRequest>,
) -> AppResult<ApiResponse<ScheduleMeetingResponse>> {
    let meeting = state.meeting_service.schedule(&user.id, req.input).await?;

    // Notify the other members (fire and forget - don't block response)
    let notification_service = state.notification_service.clone();
    let meeting_id = meeting.id.clone();
    let group_id = meeting.group_id.clone();
    let meeting_title = meeting.title.clone();
    let organizer_id = user.id.clone();
    let organizer_name = user.username.clone();

    tokio::spawn(async move {
        let input = NotifyInput {
            actor_id: organizer_id,
            scope: NotifyScope::Group(group_id),
            category: NotificationCategory::Meeting,
            title: "New meeting".to_string(),
            body: format!("{organizer_name} scheduled {meeting_title}"),
            link_url: Some(format!("/meetings/{meeting_id}")),
        };

        match notification_service.fan_out(input).await {
            Ok(delivered) => {
                debug!(meeting_id = %meeting_id, delivered, "Notified group of new meeting");
            }
            Err(e) => {
                warn!(error = %e, meeting_id = %meeting_id, "Failed to notify group of new meeting");
            }
        }
    });

    Ok(ApiResponse::ok(ScheduleMeetingResponse {
        meeting_id: meeting.id,
        room_id: meeting.room_id,
    }))
}

/// Upcoming meetings request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMeetingsRequest {
    pub group_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    10
}

/// List upcoming meetings in a group (soonest first).
async fn upcoming(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpcomingMeetingsRequest>,
) -> AppResult<ApiResponse<Vec<MeetingResponse>>> {
    let limit = req.limit.min(100);
    let meetings = state
        .meeting_service
        .upcoming(&user.id, &req.group_id, limit)
        .await?;

    Ok(ApiResponse::ok(
        meetings.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/upcoming", post(upcoming))
}
