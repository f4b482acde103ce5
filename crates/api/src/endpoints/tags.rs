//! Tag endpoints.

use axum::{Json, Router, extract::State, routing::post};
use koinonia_common::AppResult;
use koinonia_db::entities::tag;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Tag response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub usage_count: i64,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            usage_count: tag.usage_count,
        }
    }
}

/// Trending tags request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTagsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    10
}

/// List tags by usage count.
async fn trending(
    State(state): State<AppState>,
    Json(req): Json<TrendingTagsRequest>,
) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let limit = req.limit.min(100);
    let tags = state.tag_service.trending(limit).await?;

    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}

/// Search tags request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTagsRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Search tags by name prefix.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchTagsRequest>,
) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let limit = req.limit.min(100);
    let tags = state.tag_service.search(&req.query, limit).await?;

    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trending", post(trending))
        .route("/search", post(search))
}
