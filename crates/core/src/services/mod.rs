//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod following;
pub mod group;
pub mod meeting;
pub mod moderation;
pub mod notification;
pub mod reel;
pub mod tag;
pub mod user;

pub use comment::{AddCommentInput, CommentService};
pub use following::FollowingService;
pub use group::{CreateGroupInput, GroupResponse, GroupService};
pub use meeting::{MeetingService, ScheduleMeetingInput};
pub use moderation::{
    ClassifierVerdict, ContentClassifier, HttpClassifier, ModerationGate, NoOpClassifier,
    PublishOutcome,
};
pub use notification::{NotificationResponse, NotificationService, NotifyInput, NotifyScope};
pub use reel::{CreateReelInput, ReelService};
pub use tag::TagService;
pub use user::{CreateUserInput, UpdateUserInput, UserService};
