//! Meeting entity (scheduled group meetings).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meeting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The group this meeting belongs to
    #[sea_orm(indexed)]
    pub group_id: String,

    /// User who scheduled the meeting
    #[sea_orm(indexed)]
    pub organizer_id: String,

    /// Meeting title
    pub title: String,

    /// Conference room identifier handed to the video provider
    pub room_id: String,

    /// When the meeting is scheduled to start
    #[sea_orm(indexed)]
    pub scheduled_at: DateTimeWithTimeZone,

    /// Planned duration in minutes (optional)
    #[sea_orm(nullable)]
    pub duration_minutes: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Organizer,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
