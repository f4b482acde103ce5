//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use koinonia_core::{
    CommentService, FollowingService, GroupService, MeetingService, NotificationService,
    ReelService, TagService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub reel_service: ReelService,
    pub comment_service: CommentService,
    pub group_service: GroupService,
    pub meeting_service: MeetingService,
    pub following_service: FollowingService,
    pub notification_service: NotificationService,
    pub tag_service: TagService,
}

/// Authentication middleware.
///
/// Resolves the bearer token to a user and stores it in request
/// extensions. Requests without a valid token pass through; handlers
/// that need a user reject them via the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
