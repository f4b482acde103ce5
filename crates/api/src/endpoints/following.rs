//! Follow relationship endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::{NotifyInput, NotifyScope};
use koinonia_db::entities::{following, notification::NotificationCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow relationship response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingItemResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<following::Model> for FollowingItemResponse {
    fn from(following: following::Model) -> Self {
        Self {
            id: following.id,
            follower_id: following.follower_id,
            followee_id: following.followee_id,
            created_at: following.created_at.to_rfc3339(),
        }
    }
}

/// Follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub followed: bool,
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    state.following_service.follow(&user.id, &req.user_id).await?;

    // Notify the followed user (fire and forget - don't block response)
    let notification_service = state.notification_service.clone();
    let followee_id = req.user_id.clone();
    let follower_id = user.id.clone();
    let follower_name = user.username.clone();

    tokio::spawn(async move {
        let input = NotifyInput {
            actor_id: follower_id.clone(),
            scope: NotifyScope::User(followee_id.clone()),
            category: NotificationCategory::Follow,
            title: "New follower".to_string(),
            body: format!("{follower_name} started following you"),
            link_url: Some(format!("/users/{follower_id}")),
        };

        match notification_service.fan_out(input).await {
            Ok(delivered) => {
                debug!(followee_id = %followee_id, delivered, "Notified user of new follower");
            }
            Err(e) => {
                warn!(error = %e, followee_id = %followee_id, "Failed to notify user of new follower");
            }
        }
    });

    Ok(ApiResponse::ok(FollowResponse { followed: true }))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .unfollow(&user.id, &req.user_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

/// Follow list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    10
}

/// List a user's followers (newest first).
async fn followers(
    State(state): State<AppState>,
    Json(req): Json<FollowListRequest>,
) -> AppResult<ApiResponse<Vec<FollowingItemResponse>>> {
    let limit = req.limit.min(100);
    let rows = state
        .following_service
        .get_followers(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// List who a user follows (newest first).
async fn following(
    State(state): State<AppState>,
    Json(req): Json<FollowListRequest>,
) -> AppResult<ApiResponse<Vec<FollowingItemResponse>>> {
    let limit = req.limit.min(100);
    let rows = state
        .following_service
        .get_following(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow))
        .route("/delete", post(unfollow))
        .route("/followers", post(followers))
        .route("/following", post(following))
}
