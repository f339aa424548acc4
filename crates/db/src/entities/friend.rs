//! Friend entity (directed friend requests and friendships between users).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a friend edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who sent the (latest) request
    pub from_id: String,

    /// The user who received the (latest) request
    pub to_id: String,

    pub status: FriendStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// The other endpoint of the edge, seen from `user_id`.
    #[must_use]
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.from_id == user_id {
            &self.to_id
        } else {
            &self.from_id
        }
    }

    /// Whether `user_id` is one of the two endpoints.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.from_id == user_id || self.to_id == user_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FromId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ToId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
