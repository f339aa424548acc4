//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Image URL, empty when the post has none
    #[sea_orm(default_value = "")]
    pub image: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    #[serde(skip_serializing)]
    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    /// Non-deleted comments count (recomputed)
    #[sea_orm(default_value = 0)]
    pub comment_count: i32,

    /// "like" reactions count (recomputed)
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    /// "dislike" reactions count (recomputed)
    #[sea_orm(default_value = 0)]
    pub dislike_count: i32,

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
