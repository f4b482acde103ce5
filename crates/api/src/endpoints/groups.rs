//! Group endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_core::{CreateGroupInput, GroupResponse, NotifyInput, NotifyScope};
use koinonia_db::entities::{
    group,
    group_member::{self, GroupRole},
    notification::NotificationCategory,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Group list item response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupItemResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub members_count: i64,
    pub created_at: String,
}

impl From<group::Model> for GroupItemResponse {
    fn from(group: group::Model) -> Self {
        Self {
            id: group.id,
            owner_id: group.owner_id,
            name: group.name,
            description: group.description,
            members_count: group.members_count,
            created_at: group.created_at.to_rfc3339(),
        }
    }
}

/// Group member response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    pub user_id: String,
    pub group_id: String,
    pub role: GroupRole,
    pub joined_at: String,
}

impl From<group_member::Model> for MemberResponse {
    fn from(member: group_member::Model) -> Self {
        Self {
            id: member.id,
            user_id: member.user_id,
            group_id: member.group_id,
            role: member.role,
            joined_at: member.joined_at.to_rfc3339(),
        }
    }
}

/// Create a new group.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupItemResponse>> {
    let group = state.group_service.create(&user.id, input).await?;

    Ok(ApiResponse::ok(group.into()))
}

/// Show group request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowGroupRequest {
    pub group_id: String,
}

/// Get a group by ID, with the caller's membership info.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowGroupRequest>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let group = state
        .group_service
        .get_with_member_info(&req.group_id, &user.id)
        .await?;

    Ok(ApiResponse::ok(group))
}

/// Paginated list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    10
}

/// List groups by member count.
async fn popular(
    State(state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> AppResult<ApiResponse<Vec<GroupItemResponse>>> {
    let limit = req.limit.min(100);
    let groups = state.group_service.list_popular(limit, req.offset).await?;

    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

/// List groups the authenticated user is a member of.
async fn joined(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListGroupsRequest>,
) -> AppResult<ApiResponse<Vec<GroupItemResponse>>> {
    let limit = req.limit.min(100);
    let groups = state
        .group_service
        .list_joined(&user.id, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

/// Search groups request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroupsRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Search groups by name.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchGroupsRequest>,
) -> AppResult<ApiResponse<Vec<GroupItemResponse>>> {
    let limit = req.limit.min(100);
    let groups = state
        .group_service
        .search(&req.query, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(groups.into_iter().map(Into::into).collect()))
}

/// Group ID request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupIdRequest {
    pub group_id: String,
}

/// Join group response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupResponse {
    pub joined: bool,
}

/// Join a group.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<JoinGroupResponse>> {
    let group = state.group_service.join(&user.id, &req.group_id).await?;

    // Notify the other members (fire and forget - don't block response)
    let notification_service = state.notification_service.clone();
    let group_id = group.id.clone();
    let group_name = group.name.clone();
    let joiner_id = user.id.clone();
    let joiner_name = user.username.clone();

    tokio::spawn(async move {
        let input = NotifyInput {
            actor_id: joiner_id,
            scope: NotifyScope::Group(group_id.clone()),
            category: NotificationCategory::Group,
            title: "New member".to_string(),
            body: format!("{joiner_name} joined {group_name}"),
            link_url: Some(format!("/groups/{group_id}")),
        };

        match notification_service.fan_out(input).await {
            Ok(delivered) => {
                debug!(group_id = %group_id, delivered, "Notified group of new member");
            }
            Err(e) => {
                warn!(error = %e, group_id = %group_id, "Failed to notify group of new member");
            }
        }
    });

    Ok(ApiResponse::ok(JoinGroupResponse { joined: true }))
}

/// Leave a group.
async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.group_service.leave(&user.id, &req.group_id).await?;

    Ok(ApiResponse::ok(()))
}

/// List members request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersRequest {
    pub group_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// List members of a group.
async fn members(
    State(state): State<AppState>,
    Json(req): Json<ListMembersRequest>,
) -> AppResult<ApiResponse<Vec<MemberResponse>>> {
    let limit = req.limit.min(100);
    let members = state
        .group_service
        .list_members(&req.group_id, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(
        members.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/popular", post(popular))
        .route("/joined", post(joined))
        .route("/search", post(search))
        .route("/join", post(join))
        .route("/leave", post(leave))
        .route("/members", post(members))
}
