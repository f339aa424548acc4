//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use circle_common::{AppError, AppResult, Pagination};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a non-deleted comment by ID.
    pub async fn find_active_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .filter(comment::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count non-deleted comments on a post.
    pub async fn count_active_by_post(&self, post_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsDeleted.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All non-deleted comments on a post, newest first.
    pub async fn find_all_by_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsDeleted.eq(false))
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of non-deleted comments on a post, newest first.
    pub async fn find_by_post(
        &self,
        post_id: &str,
        pagination: Pagination,
    ) -> AppResult<(Vec<comment::Model>, u64)> {
        let count = self.count_active_by_post(post_id).await?;

        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsDeleted.eq(false))
            .order_by_desc(comment::Column::CreatedAt)
            .offset(pagination.offset())
            .limit(pagination.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((comments, count))
    }

    /// Overwrite the denormalized reaction tally.
    pub async fn set_reaction_counts(
        &self,
        comment_id: &str,
        like: u64,
        dislike: u64,
    ) -> AppResult<()> {
        Comment::update_many()
            .col_expr(comment::Column::LikeCount, Expr::value(like as i32))
            .col_expr(comment::Column::DislikeCount, Expr::value(dislike as i32))
            .filter(comment::Column::Id.eq(comment_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_comment(id: &str, post_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            content: "nice".to_string(),
            author_id: "u1".to_string(),
            post_id: post_id.to_string(),
            is_deleted: false,
            like_count: 0,
            dislike_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_post_counts_then_pages() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .append_query_results([[
                    create_test_comment("c12", "p1"),
                    create_test_comment("c11", "p1"),
                ]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let (comments, count) = repo
            .find_by_post("p1", Pagination::new(Some(2), Some(10)))
            .await
            .unwrap();

        assert_eq!(count, 12);
        assert_eq!(comments.len(), 2);
    }

    #[tokio::test]
    async fn test_find_all_by_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "p1")]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let comments = repo.find_all_by_post("p1").await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].post_id, "p1");
    }
}
