//! Repository layer.
//!
//! Each repository wraps an `Arc<DatabaseConnection>` and exposes the
//! storage operations one entity needs. Services own repositories and
//! never touch `sea_orm` query types directly.

pub mod comment;
pub mod following;
pub mod group;
pub mod meeting;
pub mod notification;
pub mod reel;
pub mod tag;
pub mod user;

pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use group::GroupRepository;
pub use meeting::MeetingRepository;
pub use notification::NotificationRepository;
pub use reel::ReelRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
