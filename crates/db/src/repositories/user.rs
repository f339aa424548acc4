//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use circle_common::{AppError, AppResult, NameFilter, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID, including deleted accounts.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a non-deleted user by ID.
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by normalized email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List non-deleted users, newest first.
    ///
    /// `ids` restricts the result to the given users; `name` applies a
    /// case-insensitive substring match. Returns the page and the total
    /// number of matching users.
    pub async fn search(
        &self,
        ids: Option<&[String]>,
        name: Option<&NameFilter>,
        pagination: Pagination,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let mut condition = Condition::all().add(user::Column::IsDeleted.eq(false));

        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok((vec![], 0));
            }
            condition = condition.add(user::Column::Id.is_in(ids.to_vec()));
        }

        if let Some(filter) = name {
            condition = condition.add(
                Expr::expr(Func::lower(Expr::col(user::Column::Name))).like(filter.like_pattern()),
            );
        }

        let count = User::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let users = User::find()
            .filter(condition)
            .order_by_desc(user::Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((users, count))
    }

    /// Overwrite the denormalized post count.
    pub async fn set_post_count(&self, user_id: &str, count: u64) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::PostCount, Expr::value(count as i32))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite the denormalized friend count.
    pub async fn set_friend_count(&self, user_id: &str, count: u64) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::FriendCount, Expr::value(count as i32))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
