//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// Normalized (trimmed, lower-cased) email address
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(nullable)]
    pub cover_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub about_me: Option<String>,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub company: Option<String>,

    #[sea_orm(nullable)]
    pub job_title: Option<String>,

    #[sea_orm(nullable)]
    pub facebook_link: Option<String>,

    #[sea_orm(nullable)]
    pub instagram_link: Option<String>,

    #[sea_orm(nullable)]
    pub linkedin_link: Option<String>,

    #[sea_orm(nullable)]
    pub twitter_link: Option<String>,

    /// Non-deleted posts count (recomputed)
    #[sea_orm(default_value = 0)]
    pub post_count: i32,

    /// Accepted friendships count (recomputed)
    #[sea_orm(default_value = 0)]
    pub friend_count: i32,

    #[sea_orm(default_value = false)]
    pub is_deleted: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
