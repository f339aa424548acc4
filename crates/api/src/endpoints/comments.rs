//! Comment endpoints.

use axum::{Router, extract::State, routing::{get, post}};
use circle_common::{AppResult, Page};
use circle_core::{CommentView, CreateCommentInput, UpdateCommentInput};
use circle_db::{entities::comment, repositories::ReactionTally};
use serde::Serialize;

use super::users::UserResponse;
use crate::{
    extractors::{ApiJson, AuthUser, PathId},
    middleware::AppState,
    response::ApiResponse,
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    /// Post ID.
    pub post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserResponse>,
    pub reactions: ReactionTally,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            content: c.content,
            post: c.post_id,
            author: None,
            reactions: ReactionTally {
                like: c.like_count.max(0) as u64,
                dislike: c.dislike_count.max(0) as u64,
            },
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        Self {
            author: view.author.map(Into::into),
            ..view.comment.into()
        }
    }
}

/// A page of comments.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPageResponse {
    pub comments: Vec<CommentResponse>,
    pub total_pages: u64,
    pub count: u64,
}

impl From<Page<CommentView>> for CommentPageResponse {
    fn from(page: Page<CommentView>) -> Self {
        Self {
            comments: page.items.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            count: page.count,
        }
    }
}

/// Comment on a post.
async fn create(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let view = state.comment_service.create(&caller_id, input).await?;
    Ok(ApiResponse::ok(view.into(), "Create new comment successfully"))
}

/// Get a comment.
async fn show(
    AuthUser(_caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&id).await?;
    Ok(ApiResponse::ok(comment.into(), "Get comment successfully"))
}

/// Edit a comment.
async fn update(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    ApiJson(input): ApiJson<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.update(&caller_id, &id, input).await?;
    Ok(ApiResponse::ok(comment.into(), "Update comment successfully"))
}

/// Delete a comment.
async fn delete(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.delete(&caller_id, &id).await?;
    Ok(ApiResponse::ok(comment.into(), "Delete comment successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).put(update).delete(delete))
}
