//! Database entities.
//!
//! sea-orm entity definitions for every table in the schema.

pub mod comment;
pub mod following;
pub mod group;
pub mod group_member;
pub mod meeting;
pub mod notification;
pub mod reel;
pub mod tag;
pub mod user;

pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use group::Entity as Group;
pub use group_member::Entity as GroupMember;
pub use meeting::Entity as Meeting;
pub use notification::Entity as Notification;
pub use reel::Entity as Reel;
pub use tag::Entity as Tag;
pub use user::Entity as User;
