//! Reel entity (short-form video posts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reel")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Reel title
    pub title: String,

    /// Longer description (optional)
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Video URL (storage is external to this service)
    pub video_url: String,

    /// Normalized tag names attached at creation time
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    /// Like count (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_count: i64,

    /// View count (denormalized)
    #[sea_orm(default_value = 0)]
    pub views_count: i64,

    /// Comment count (denormalized)
    #[sea_orm(default_value = 0)]
    pub comments_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
