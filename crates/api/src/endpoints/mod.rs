//! API endpoints.

mod comments;
mod following;
mod groups;
mod meetings;
mod notifications;
mod reels;
mod tags;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/reels", reels::router())
        .nest("/comments", comments::router())
        .nest("/groups", groups::router())
        .nest("/meetings", meetings::router())
        .nest("/following", following::router())
        .nest("/notifications", notifications::router())
        .nest("/tags", tags::router())
}
