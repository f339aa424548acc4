//! User endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use circle_common::{AppResult, Page, PageQuery};
use circle_core::{RegisterInput, UpdateProfileInput, UserWithFriendship};
use circle_db::entities::user;
use serde::Serialize;

use super::{auth::SessionResponse, friends::FriendResponse};
use crate::{
    extractors::{ApiJson, AuthUser, PathId},
    middleware::AppState,
    response::ApiResponse,
};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub about_me: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub facebook_link: Option<String>,
    pub instagram_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub twitter_link: Option<String>,
    pub post_count: i32,
    pub friend_count: i32,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            cover_url: user.cover_url,
            about_me: user.about_me,
            city: user.city,
            country: user.country,
            company: user.company,
            job_title: user.job_title,
            facebook_link: user.facebook_link,
            instagram_link: user.instagram_link,
            linkedin_link: user.linkedin_link,
            twitter_link: user.twitter_link,
            post_count: user.post_count,
            friend_count: user.friend_count,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A user as seen by the caller, with the friendship edge between them.
#[derive(Serialize)]
pub struct UserWithFriendshipResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub friendship: Option<FriendResponse>,
}

impl From<UserWithFriendship> for UserWithFriendshipResponse {
    fn from(u: UserWithFriendship) -> Self {
        Self {
            user: u.user.into(),
            friendship: u.friendship.map(Into::into),
        }
    }
}

/// A page of users.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPageResponse {
    pub users: Vec<UserWithFriendshipResponse>,
    pub total_pages: u64,
    pub count: u64,
}

impl From<Page<UserWithFriendship>> for UserPageResponse {
    fn from(page: Page<UserWithFriendship>) -> Self {
        Self {
            users: page.items.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            count: page.count,
        }
    }
}

/// Register a new user.
async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = state.user_service.register(input).await?;
    Ok(ApiResponse::ok(session.into(), "Create user successfully"))
}

/// List users.
async fn list(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<UserPageResponse>> {
    let page = state
        .user_service
        .list(&caller_id, query.name_filter().as_ref(), query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get users successfully"))
}

/// Get current user.
async fn me(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_me(&caller_id).await?;
    Ok(ApiResponse::ok(user.into(), "Get current user successfully"))
}

/// Get a user by ID.
async fn show(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<ApiResponse<UserWithFriendshipResponse>> {
    let user = state.user_service.get(&caller_id, &id).await?;
    Ok(ApiResponse::ok(user.into(), "Get single user successfully"))
}

/// Update the caller's profile.
async fn update(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
    ApiJson(input): ApiJson<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .update_profile(&caller_id, &id, input)
        .await?;
    Ok(ApiResponse::ok(user.into(), "Update user successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/me", get(me))
        .route("/{id}", get(show).put(update))
}
