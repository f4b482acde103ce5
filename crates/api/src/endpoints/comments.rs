//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::{AddCommentInput, NotifyInput, NotifyScope, PublishOutcome};
use koinonia_db::entities::{comment, notification::NotificationCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub reel_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            reel_id: comment.reel_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Add comment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(flatten)]
    pub input: AddCommentInput,
}

/// Result of a comment publication attempt.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishCommentResponse {
    pub comment_id: Option<String>,
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Add a comment to a reel.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<ApiResponse<PublishCommentResponse>> {
    let comment = match state.comment_service.add(&user.id, req.input).await? {
        PublishOutcome::Published(comment) => comment,
        PublishOutcome::Rejected { reason } => {
            return Ok(ApiResponse::ok(PublishCommentResponse {
                comment_id: None,
                flagged: true,
                reason,
            }));
        }
    };

    // Notify the reel author (fire and forget - don't block response)
    let reel_service = state.reel_service.clone();
    let notification_service = state.notification_service.clone();
    let reel_id = comment.reel_id.clone();
    let commenter_id = user.id.clone();
    let commenter_name = user.username.clone();

    tokio::spawn(async move {
        // Look the author up here so the recipient reflects current state.
        let reel = match reel_service.get_by_id(&reel_id).await {
            Ok(reel) => reel,
            Err(e) => {
                warn!(error = %e, reel_id = %reel_id, "Failed to load reel for comment notification");
                return;
            }
        };

        let input = NotifyInput {
            actor_id: commenter_id,
            scope: NotifyScope::User(reel.author_id),
            category: NotificationCategory::Content,
            title: "New comment".to_string(),
            body: format!("{commenter_name} commented on your reel"),
            link_url: Some(format!("/reels/{reel_id}")),
        };

        match notification_service.fan_out(input).await {
            Ok(delivered) => {
                debug!(reel_id = %reel_id, delivered, "Notified reel author of comment");
            }
            Err(e) => {
                warn!(error = %e, reel_id = %reel_id, "Failed to notify reel author of comment");
            }
        }
    });

    Ok(ApiResponse::ok(PublishCommentResponse {
        comment_id: Some(comment.id),
        flagged: false,
        reason: None,
    }))
}

/// List comments request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    pub reel_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    10
}

/// List comments on a reel (newest first).
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListCommentsRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let limit = req.limit.min(100);
    let comments = state
        .comment_service
        .list(&req.reel_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
}
