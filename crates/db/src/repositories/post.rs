//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use circle_common::{AppError, AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a non-deleted post by ID.
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .filter(post::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count non-deleted posts written by a user.
    pub async fn count_active_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .filter(post::Column::IsDeleted.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Non-deleted posts by any of the given authors, newest first.
    pub async fn find_by_authors(
        &self,
        author_ids: &[String],
        pagination: Pagination,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        if author_ids.is_empty() {
            return Ok((vec![], 0));
        }

        let query = Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .filter(post::Column::IsDeleted.eq(false));

        let count = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let posts = query
            .order_by_desc(post::Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((posts, count))
    }

    /// Overwrite the denormalized comment count.
    pub async fn set_comment_count(&self, post_id: &str, count: u64) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::CommentCount, Expr::value(count as i32))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite the denormalized reaction tally.
    pub async fn set_reaction_counts(&self, post_id: &str, like: u64, dislike: u64) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::LikeCount, Expr::value(like as i32))
            .col_expr(post::Column::DislikeCount, Expr::value(dislike as i32))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
