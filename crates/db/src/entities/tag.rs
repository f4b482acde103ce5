//! Tag entity (shared registry of normalized tags).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A normalized tag with its usage counter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The tag name (lowercase, whitespace collapsed)
    #[sea_orm(unique)]
    pub name: String,

    /// Number of reels that have used this tag
    #[sea_orm(default_value = 0)]
    pub usage_count: i64,

    pub created_at: DateTimeWithTimeZone,

    /// When the tag was last attached to a reel
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
