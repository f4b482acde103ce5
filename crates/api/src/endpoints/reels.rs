//! Reel endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::{CreateReelInput, NotifyInput, NotifyScope, PublishOutcome};
use koinonia_db::entities::{notification::NotificationCategory, reel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Reel response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub tags: serde_json::Value,
    pub likes_count: i64,
    pub views_count: i64,
    pub comments_count: i64,
    pub created_at: String,
}

impl From<reel::Model> for ReelResponse {
    fn from(reel: reel::Model) -> Self {
        Self {
            id: reel.id,
            author_id: reel.author_id,
            title: reel.title,
            description: reel.description,
            video_url: reel.video_url,
            tags: reel.tags,
            likes_count: reel.likes_count,
            views_count: reel.views_count,
            comments_count: reel.comments_count,
            created_at: reel.created_at.to_rfc3339(),
        }
    }
}

/// Create reel request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReelRequest {
    #[serde(flatten)]
    pub input: CreateReelInput,
}

/// Result of a publication attempt.
///
/// A flagged reel is a normal response, not an error: `entityId` is null
/// and `flagged` is true.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReelResponse {
    pub entity_id: Option<String>,
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Publish a new reel.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReelRequest>,
) -> AppResult<ApiResponse<PublishReelResponse>> {
    let reel = match state.reel_service.publish(&user.id, req.input).await? {
        PublishOutcome::Published(reel) => reel,
        PublishOutcome::Rejected { reason } => {
            return Ok(ApiResponse::ok(PublishReelResponse {
                entity_id: None,
                flagged: true,
                reason,
            }));
        }
    };

    // Notify followers (fire and forget - don't block response)
    let notification_service = state.notification_service.clone();
    let reel_id = reel.id.clone();
    let author_id = user.id.clone();
    let author_name = user.username.clone();

    tokio::spawn(async move {
        let input = NotifyInput {
            actor_id: author_id.clone(),
            scope: NotifyScope::Followers(author_id),
            category: NotificationCategory::Reel,
            title: "New reel".to_string(),
            body: format!("{author_name} posted a new reel"),
            link_url: Some(format!("/reels/{reel_id}")),
        };

        match notification_service.fan_out(input).await {
            Ok(delivered) => {
                debug!(reel_id = %reel_id, delivered, "Notified followers of new reel");
            }
            Err(e) => {
                warn!(error = %e, reel_id = %reel_id, "Failed to notify followers of new reel");
            }
        }
    });

    Ok(ApiResponse::ok(PublishReelResponse {
        entity_id: Some(reel.id),
        flagged: false,
        reason: None,
    }))
}

/// Show reel request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowReelRequest {
    pub reel_id: String,
}

/// Get a reel by ID.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowReelRequest>,
) -> AppResult<ApiResponse<ReelResponse>> {
    let reel = state.reel_service.get_by_id(&req.reel_id).await?;

    Ok(ApiResponse::ok(reel.into()))
}

/// Timeline request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    10
}

/// Get the global timeline (newest first).
async fn timeline(
    State(state): State<AppState>,
    Json(req): Json<TimelineRequest>,
) -> AppResult<ApiResponse<Vec<ReelResponse>>> {
    let limit = req.limit.min(100);
    let reels = state
        .reel_service
        .timeline(limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(reels.into_iter().map(Into::into).collect()))
}

/// User reels request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReelsRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Get reels by a specific author (newest first).
async fn by_user(
    State(state): State<AppState>,
    Json(req): Json<UserReelsRequest>,
) -> AppResult<ApiResponse<Vec<ReelResponse>>> {
    let limit = req.limit.min(100);
    let reels = state
        .reel_service
        .by_author(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(reels.into_iter().map(Into::into).collect()))
}

/// Reel ID request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelIdRequest {
    pub reel_id: String,
}

/// Like a reel.
async fn like(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReelIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.reel_service.like(&req.reel_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Record a view on a reel.
async fn view(
    State(state): State<AppState>,
    Json(req): Json<ReelIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.reel_service.view(&req.reel_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Delete a reel.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReelIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.reel_service.delete(&user.id, &req.reel_id).await?;

    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/timeline", post(timeline))
        .route("/user", post(by_user))
        .route("/like", post(like))
        .route("/view", post(view))
        .route("/delete", post(delete))
}
