//! Friend endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::{delete, get, post, put},
};
use circle_common::{AppResult, PageQuery};
use circle_core::{ReactRequestInput, SendRequestInput};
use circle_db::entities::friend::{self, FriendStatus};
use serde::Serialize;

use super::users::UserPageResponse;
use crate::{
    extractors::{ApiJson, AuthUser, PathId},
    middleware::AppState,
    response::ApiResponse,
};

/// Friend edge response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    pub id: String,
    pub from: String,
    pub to: String,
    pub status: FriendStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<friend::Model> for FriendResponse {
    fn from(f: friend::Model) -> Self {
        Self {
            id: f.id,
            from: f.from_id,
            to: f.to_id,
            status: f.status,
            created_at: f.created_at.to_rfc3339(),
            updated_at: f.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Send a friend request.
async fn send_request(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SendRequestInput>,
) -> AppResult<ApiResponse<FriendResponse>> {
    let edge = state.friend_service.send_request(&caller_id, input).await?;
    Ok(ApiResponse::ok(edge.into(), "Request has been sent"))
}

/// Users who sent the caller a pending request.
async fn incoming(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<UserPageResponse>> {
    let page = state
        .friend_service
        .list_incoming(&caller_id, query.name_filter().as_ref(), query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get received requests successfully"))
}

/// Users the caller sent a pending request to.
async fn outgoing(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<UserPageResponse>> {
    let page = state
        .friend_service
        .list_outgoing(&caller_id, query.name_filter().as_ref(), query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get sent requests successfully"))
}

/// The caller's friends.
async fn list(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<UserPageResponse>> {
    let page = state
        .friend_service
        .list_friends(&caller_id, query.name_filter().as_ref(), query.pagination())
        .await?;
    Ok(ApiResponse::ok(page.into(), "Get friends successfully"))
}

/// Accept or decline a received request.
async fn react_request(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(from_id): PathId,
    ApiJson(input): ApiJson<ReactRequestInput>,
) -> AppResult<ApiResponse<FriendResponse>> {
    let edge = state
        .friend_service
        .react_request(&caller_id, &from_id, input)
        .await?;
    Ok(ApiResponse::ok(edge.into(), "React friend request successfully"))
}

/// Withdraw a sent request.
async fn cancel_request(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(to_id): PathId,
) -> AppResult<ApiResponse<FriendResponse>> {
    let edge = state
        .friend_service
        .cancel_request(&caller_id, &to_id)
        .await?;
    Ok(ApiResponse::ok(edge.into(), "Friend request has been cancelled"))
}

/// Remove a friend.
async fn remove(
    AuthUser(caller_id): AuthUser,
    State(state): State<AppState>,
    PathId(other_id): PathId,
) -> AppResult<ApiResponse<FriendResponse>> {
    let edge = state
        .friend_service
        .remove_friend(&caller_id, &other_id)
        .await?;
    Ok(ApiResponse::ok(edge.into(), "Friend has been removed"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/requests", post(send_request))
        .route("/requests/incoming", get(incoming))
        .route("/requests/outgoing", get(outgoing))
        .route(
            "/requests/{user_id}",
            put(react_request).delete(cancel_request),
        )
        .route("/{user_id}", delete(remove))
}
