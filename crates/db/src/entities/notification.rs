//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification categories.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    /// A meeting was scheduled in one of the recipient's groups
    #[sea_orm(string_value = "meeting")]
    Meeting,
    /// Someone the recipient follows published a reel
    #[sea_orm(string_value = "reel")]
    Reel,
    /// Group membership activity (someone joined)
    #[sea_orm(string_value = "group")]
    Group,
    /// Activity on the recipient's content (a comment)
    #[sea_orm(string_value = "content")]
    Content,
    /// Someone followed the recipient
    #[sea_orm(string_value = "follow")]
    Follow,
    /// Platform announcements
    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving this notification
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// The user whose action triggered it (None for system notifications)
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    /// Notification category
    pub category: NotificationCategory,

    /// Short headline
    pub title: String,

    /// Longer message
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Deep link into the client (optional)
    #[sea_orm(nullable)]
    pub link_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
