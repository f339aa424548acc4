//! Post endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::{get, post},
};
use circle_common::{AppResult, Page, PageQuery};
use circle_core::{CreatePostInput, PostDetail, PostView, UpdatePostInput};
use circle_db::{entities::post, repositories::ReactionTally};
use serde::Serialize;

use super::{
    comments::{CommentPageResponse, CommentResponse},
    users::UserResponse,
};
use crate::{
    extractors::{ApiJson, AuthUser, MaybeAuthUser, PathId},
    middleware::AppState,
    response::ApiResponse,
};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub content: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserResponse>,
    pub comment_count: i32,
    pub reactions: ReactionTally,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            content: p.content,
            image: p.image,
            author: None,
            comment_count: p.comment_count,
            reactions: ReactionTally {
                like: p.like_count.max(0) as u64,
                dislike: p.dislike_count.max(0) as u64,
            },
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        Self {
            author: view.author.map(Into::into),
            ..view.post.into()
        }
    }
}

/// A post with its comments.
#[derive(Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: PostView {
                post: detail.post,
                author: detail.author,
            }
            .into(),
            comments: detail.comments.into_iter().map(Into::into).collect(),
        }
    }
}

/// A page of posts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub posts: Vec<PostResponse>,
    pub total_pages: u64,
    pub count: u64,
}

impl From<Page<PostView>> for PostPageResponse {
    fn from(page: Page<PostView>) -> Self {
        Self {
            posts: page.items.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            count: page.count,
        }
    }
}

/// Publish a post.
async fn create(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let view = state.post_service.create(&caller_id, input).await?;
    Ok(ApiResponse::ok(view.into(), "Create new post successfully"))
}

/// Get a post with its comments.
async fn show(
    AuthUser(_caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let detail = state.post_service.get(&id).await?;
    Ok(ApiResponse::ok(detail.into(), "Get post successfully"))
}

/// Edit a post.
async fn update(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    ApiJson(input): ApiJson<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&caller_id, &id, input).await?;
    Ok(ApiResponse::ok(post.into(), "Update post successfully"))
}

/// Delete a post.
async fn delete(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.delete(&caller_id, &id).await?;
    Ok(ApiResponse::ok(post.into(), "Delete post successfully"))
}

/// Posts by a user and their friends. Login is optional.
async fn feed(
    MaybeAuthUser(_caller_id): MaybeAuthUser,
    State(state): State<AppState>,
    PathId(user_id): PathId,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<PostPageResponse>> {
    let page = state
        .post_service
        .feed(&user_id, query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get posts successfully"))
}

/// One page of a post's comments.
async fn comments(
    AuthUser(_caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<CommentPageResponse>> {
    let page = state
        .post_service
        .comments(&id, query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get comments successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/user/{user_id}", get(feed))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/comments", get(comments))
}
