//! Friend repository.

use std::sync::Arc;

use crate::entities::{
    Friend,
    friend::{self, FriendStatus},
};
use circle_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter,
};

/// Friend repository for database operations.
#[derive(Clone)]
pub struct FriendRepository {
    db: Arc<DatabaseConnection>,
}

/// Edges between `a` and `b` in either direction.
fn between(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(friend::Column::FromId.eq(a))
                .add(friend::Column::ToId.eq(b)),
        )
        .add(
            Condition::all()
                .add(friend::Column::FromId.eq(b))
                .add(friend::Column::ToId.eq(a)),
        )
}

/// Edges touching `user_id` in either direction.
fn touching(user_id: &str) -> Condition {
    Condition::any()
        .add(friend::Column::FromId.eq(user_id))
        .add(friend::Column::ToId.eq(user_id))
}

impl FriendRepository {
    /// Create a new friend repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge between two users, whatever its direction or status.
    pub async fn find_between(&self, a: &str, b: &str) -> AppResult<Option<friend::Model>> {
        Friend::find()
            .filter(between(a, b))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the edge `from → to` in the given status.
    pub async fn find_directed(
        &self,
        from_id: &str,
        to_id: &str,
        status: FriendStatus,
    ) -> AppResult<Option<friend::Model>> {
        Friend::find()
            .filter(friend::Column::FromId.eq(from_id))
            .filter(friend::Column::ToId.eq(to_id))
            .filter(friend::Column::Status.eq(status))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an accepted edge between two users, in either direction.
    pub async fn find_accepted_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<friend::Model>> {
        Friend::find()
            .filter(between(a, b))
            .filter(friend::Column::Status.eq(FriendStatus::Accepted))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Edges between `user_id` and any of `others`.
    pub async fn find_between_many(
        &self,
        user_id: &str,
        others: &[String],
    ) -> AppResult<Vec<friend::Model>> {
        if others.is_empty() {
            return Ok(vec![]);
        }

        let condition = Condition::any()
            .add(
                Condition::all()
                    .add(friend::Column::FromId.eq(user_id))
                    .add(friend::Column::ToId.is_in(others.to_vec())),
            )
            .add(
                Condition::all()
                    .add(friend::Column::ToId.eq(user_id))
                    .add(friend::Column::FromId.is_in(others.to_vec())),
            );

        Friend::find()
            .filter(condition)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending requests received by a user.
    pub async fn find_incoming_pending(&self, user_id: &str) -> AppResult<Vec<friend::Model>> {
        Friend::find()
            .filter(friend::Column::ToId.eq(user_id))
            .filter(friend::Column::Status.eq(FriendStatus::Pending))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending requests sent by a user.
    pub async fn find_outgoing_pending(&self, user_id: &str) -> AppResult<Vec<friend::Model>> {
        Friend::find()
            .filter(friend::Column::FromId.eq(user_id))
            .filter(friend::Column::Status.eq(FriendStatus::Pending))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accepted edges touching a user.
    pub async fn find_accepted(&self, user_id: &str) -> AppResult<Vec<friend::Model>> {
        Friend::find()
            .filter(touching(user_id))
            .filter(friend::Column::Status.eq(FriendStatus::Accepted))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count accepted edges touching a user.
    pub async fn count_accepted(&self, user_id: &str) -> AppResult<u64> {
        Friend::find()
            .filter(touching(user_id))
            .filter(friend::Column::Status.eq(FriendStatus::Accepted))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new edge.
    pub async fn create(&self, model: friend::ActiveModel) -> AppResult<friend::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an edge.
    pub async fn update(&self, model: friend::ActiveModel) -> AppResult<friend::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an edge.
    pub async fn delete(&self, model: friend::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
