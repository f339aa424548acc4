//! Comment service.

use circle_common::{AppError, AppResult, IdGenerator, validate_id};
use circle_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::counter::CounterService;

/// A comment and its author.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: Option<user::Model>,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 5000, message = "Missing content"))]
    pub content: String,

    #[validate(custom(function = "validate_id"))]
    pub post_id: String,
}

/// Input for editing a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(length(min = 1, max = 5000, message = "Missing content"))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post.
    pub async fn create(&self, caller_id: &str, input: CreateCommentInput) -> AppResult<CommentView> {
        input.validate()?;
        let post_id = IdGenerator::normalize(&input.post_id);

        if self
            .post_repo
            .find_active_by_id(&post_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Post not found", "Create Comment Error"));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            content: Set(input.content),
            author_id: Set(caller_id.to_string()),
            post_id: Set(post_id.clone()),
            is_deleted: Set(false),
            like_count: Set(0),
            dislike_count: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        self.counters.recompute_comment_count(&post_id).await?;

        let author = self.user_repo.find_by_id(caller_id).await?;
        Ok(CommentView { comment, author })
    }

    /// Get a comment.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found", "Get Comment Error"))
    }

    /// Edit a comment. Only its author may do so.
    pub async fn update(
        &self,
        caller_id: &str,
        id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.find_own(caller_id, id, "Update Comment Error").await?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Soft-delete a comment. Only its author may do so.
    pub async fn delete(&self, caller_id: &str, id: &str) -> AppResult<comment::Model> {
        let comment = self.find_own(caller_id, id, "Delete Comment Error").await?;

        let mut active: comment::ActiveModel = comment.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let comment = self.comment_repo.update(active).await?;

        self.counters.recompute_comment_count(&comment.post_id).await?;

        Ok(comment)
    }

    async fn find_own(
        &self,
        caller_id: &str,
        id: &str,
        error_type: &'static str,
    ) -> AppResult<comment::Model> {
        self.comment_repo
            .find_active_by_id(id)
            .await?
            .filter(|c| c.author_id == caller_id)
            .ok_or_else(|| {
                AppError::not_found("Comment not found or User not authorized", error_type)
            })
    }
}
